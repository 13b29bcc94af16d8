//! Severity tiers, threat matches, and the severity-partitioned result set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rules::RuleKind;

/// Severity of a threat match, ordered from least to most urgent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Tier name as it appears in result sets and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// One tier up, saturating at `Critical`.
    pub fn promoted(self) -> Severity {
        match self {
            Severity::Low => Severity::Medium,
            Severity::Medium => Severity::High,
            Severity::High | Severity::Critical => Severity::Critical,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one rule firing on one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatMatch {
    /// Which rule fired.
    #[serde(rename = "type")]
    pub rule: RuleKind,
    /// Severity tier of this match.
    pub severity: Severity,
    /// Human-readable explanation, including the observed value and the
    /// threshold it crossed.
    pub details: String,
    /// Timestamp of the triggering record (display form; empty when the
    /// record carried none).
    pub timestamp: String,
    /// User the match is attributed to (`"unknown"` when unattributed).
    pub user: String,
    /// Origin of the triggering record, when the record named one.
    pub source: String,
}

/// All matches from one scan, partitioned by severity tier.
///
/// Every tier is always present (callers never need existence checks) and
/// each tier preserves detection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub critical: Vec<ThreatMatch>,
    pub high: Vec<ThreatMatch>,
    pub medium: Vec<ThreatMatch>,
    pub low: Vec<ThreatMatch>,
}

impl ResultSet {
    /// Matches in one tier, in detection order.
    pub fn tier(&self, severity: Severity) -> &[ThreatMatch] {
        match severity {
            Severity::Critical => &self.critical,
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    /// Total matches across all tiers.
    pub fn total(&self) -> usize {
        self.critical.len() + self.high.len() + self.medium.len() + self.low.len()
    }

    /// True when no rule fired during the scan.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// All matches, most severe tier first.
    pub fn iter_all(&self) -> impl Iterator<Item = &ThreatMatch> {
        self.critical
            .iter()
            .chain(&self.high)
            .chain(&self.medium)
            .chain(&self.low)
    }
}

/// Routes matches into severity buckets as the engine produces them.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: ResultSet,
}

impl ResultAggregator {
    pub fn new() -> Self {
        ResultAggregator::default()
    }

    /// Bucket a match by its severity. Infallible: severity is a closed
    /// enum, so every match has a tier.
    pub fn add(&mut self, m: ThreatMatch) {
        match m.severity {
            Severity::Critical => self.results.critical.push(m),
            Severity::High => self.results.high.push(m),
            Severity::Medium => self.results.medium.push(m),
            Severity::Low => self.results.low.push(m),
        }
    }

    /// Snapshot of everything collected so far.
    ///
    /// Idempotent and callable mid-scan, so hosts can consume results
    /// incrementally.
    pub fn finalize(&self) -> ResultSet {
        self.results.clone()
    }
}
