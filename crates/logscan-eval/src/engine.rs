//! Single-pass detection engine orchestrating the rule catalog.
//!
//! The engine is a synchronous fold over the record stream: for each
//! record it runs every rule in the fixed catalog order, hands matches to
//! the aggregator immediately, then ticks the progress callback. It
//! performs no I/O of its own.
//!
//! One engine serves one scan. Counters persist across `analyze` calls and
//! reset only by constructing a new engine, so hosts scanning several files
//! build one engine per file, which also makes parallel per-file scans
//! trivially isolated.

use serde::Serialize;
use tracing::debug;

use logscan_parser::{ParseError, Record};

use crate::config::RuleConfig;
use crate::error::{EngineError, Result};
use crate::result::{ResultAggregator, ResultSet, ThreatMatch};
use crate::rules::{catalog, Rule};
use crate::state::CounterStore;

/// Counters for recoverable per-record issues observed during a scan.
///
/// These never abort a scan; they are the out-of-band diagnostic channel
/// for "this log is imperfect" conditions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanDiagnostics {
    /// Records consumed from the source.
    pub records_seen: u64,
    /// Records without a parseable timestamp (off-hours rule skipped).
    pub missing_timestamp: u64,
    /// Records without a user identity (attributed to the unknown bucket).
    pub missing_user: u64,
    /// Records without an action tag (counter rules skipped).
    pub missing_action: u64,
}

/// The detection engine: drives one single-pass scan over a record stream.
pub struct DetectionEngine {
    config: RuleConfig,
    store: CounterStore,
    rules: Vec<Box<dyn Rule>>,
    diagnostics: ScanDiagnostics,
}

impl DetectionEngine {
    /// Build an engine with the given configuration (sanitized on the way
    /// in: invalid values fall back to defaults with a warning).
    pub fn new(config: RuleConfig) -> Self {
        DetectionEngine {
            config: config.sanitized(),
            store: CounterStore::new(),
            rules: catalog(),
            diagnostics: ScanDiagnostics::default(),
        }
    }

    /// The effective (sanitized) configuration.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Recoverable per-record issue counts from the scan so far.
    pub fn diagnostics(&self) -> ScanDiagnostics {
        self.diagnostics
    }

    /// Distinct (rule, entity) counters allocated so far (for monitoring).
    pub fn counter_count(&self) -> usize {
        self.store.len()
    }

    /// Scan a fallible record stream.
    ///
    /// Exactly one pass; per record, rules run in catalog order and every
    /// match goes straight to the aggregator. `progress`, when provided,
    /// is invoked exactly once per consumed record, after that record's
    /// rules have all been evaluated. A panicking callback unwinds through
    /// this call, aborting the scan.
    ///
    /// An `Err` item from the source aborts the scan with
    /// [`EngineError::Source`] and no partial result set; per-record field
    /// issues only increment [`ScanDiagnostics`].
    pub fn analyze<I>(
        &mut self,
        records: I,
        mut progress: Option<&mut dyn FnMut()>,
    ) -> Result<ResultSet>
    where
        I: IntoIterator<Item = std::result::Result<Record, ParseError>>,
    {
        let mut aggregator = ResultAggregator::new();
        for item in records {
            let record = item.map_err(EngineError::Source)?;
            self.evaluate_record(&record, &mut aggregator);
            if let Some(tick) = progress.as_mut() {
                tick();
            }
        }
        Ok(aggregator.finalize())
    }

    /// Scan an infallible record sequence. Same contract as [`analyze`]
    /// minus the source-failure path.
    ///
    /// [`analyze`]: DetectionEngine::analyze
    pub fn analyze_records<I>(
        &mut self,
        records: I,
        mut progress: Option<&mut dyn FnMut()>,
    ) -> ResultSet
    where
        I: IntoIterator<Item = Record>,
    {
        let mut aggregator = ResultAggregator::new();
        for record in records {
            self.evaluate_record(&record, &mut aggregator);
            if let Some(tick) = progress.as_mut() {
                tick();
            }
        }
        aggregator.finalize()
    }

    /// Run every rule against one record, in catalog order.
    ///
    /// Matches produced earlier for this record are passed to later rules,
    /// which is what lets the off-hours rule (last) apply its promotion.
    fn evaluate_record(&mut self, record: &Record, aggregator: &mut ResultAggregator) {
        self.diagnostics.records_seen += 1;
        if record.timestamp().is_none() {
            self.diagnostics.missing_timestamp += 1;
            debug!(
                record = self.diagnostics.records_seen,
                "record has no parseable timestamp"
            );
        }
        if record.user().is_none() {
            self.diagnostics.missing_user += 1;
        }
        if record.action_type().is_none() {
            self.diagnostics.missing_action += 1;
        }

        let mut fired: Vec<ThreatMatch> = Vec::new();
        for rule in &self.rules {
            if let Some(m) = rule.evaluate(record, &mut self.store, &self.config, &fired) {
                fired.push(m);
            }
        }
        for m in fired {
            aggregator.add(m);
        }
    }
}
