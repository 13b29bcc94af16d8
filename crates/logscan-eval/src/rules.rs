//! The fixed rule catalog: failed logins, encryption bursts, off-hours
//! activity.
//!
//! Each rule consumes one record plus the shared counter store and emits at
//! most one match. The engine evaluates rules in a fixed, documented order
//! so multi-match output is stable across runs:
//!
//! 1. failed-login
//! 2. encryption-count
//! 3. off-hours (last, so it can inspect the record's earlier matches for
//!    the compound-signal promotion)

use chrono::Timelike;
use tracing::debug;

use logscan_parser::Record;

use crate::config::RuleConfig;
use crate::result::{Severity, ThreatMatch};
use crate::state::CounterStore;

/// Entity bucket for records that carry no user identity. Unattributed
/// activity still accumulates rather than being silently dropped.
pub const UNKNOWN_ENTITY: &str = "unknown";

/// Identifier of one detection rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    FailedLogin,
    EncryptionCount,
    OffHoursAccess,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::FailedLogin => "failed_login",
            RuleKind::EncryptionCount => "encryption_count",
            RuleKind::OffHoursAccess => "off_hours_access",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One independently evaluable detection rule.
///
/// `prior` holds the matches already produced for the *same* record by
/// rules earlier in the catalog order; only the off-hours rule reads it.
pub trait Rule {
    fn kind(&self) -> RuleKind;

    fn evaluate(
        &self,
        record: &Record,
        store: &mut CounterStore,
        config: &RuleConfig,
        prior: &[ThreatMatch],
    ) -> Option<ThreatMatch>;
}

/// The catalog in its fixed evaluation order.
pub(crate) fn catalog() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(FailedLoginRule),
        Box::new(EncryptionCountRule),
        Box::new(OffHoursRule),
    ]
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Severity for a counter that just reached `count`, or `None` when the
/// count sits between boundaries. Counters advance by one, so equality is
/// exact crossing detection: each boundary emits at most once.
fn boundary_severity(
    count: u64,
    threshold: u32,
    factor: u32,
    base: Severity,
    escalated: Severity,
) -> Option<Severity> {
    let threshold = u64::from(threshold);
    if count == threshold * u64::from(factor) {
        Some(escalated)
    } else if count == threshold {
        Some(base)
    } else {
        None
    }
}

fn entity_of(record: &Record) -> &str {
    record.user().unwrap_or(UNKNOWN_ENTITY)
}

fn base_match(record: &Record, rule: RuleKind, severity: Severity, details: String) -> ThreatMatch {
    ThreatMatch {
        rule,
        severity,
        details,
        timestamp: record.timestamp_display().unwrap_or_default(),
        user: entity_of(record).to_string(),
        source: record.source().unwrap_or_default().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Failed-login rule
// ---------------------------------------------------------------------------

/// Counts failed login attempts per user; fires at the configured
/// threshold (High) and again at the escalation boundary (Critical).
pub struct FailedLoginRule;

/// Fields probed for the outcome of a login attempt.
const OUTCOME_FIELDS: &[&str] = &["login_result", "result", "status", "outcome"];

fn is_login_action(action: &str) -> bool {
    let a = action.to_ascii_lowercase();
    a.contains("login") || a.contains("logon") || a == "auth" || a == "authentication"
}

fn outcome_is_failure(record: &Record) -> Option<bool> {
    for field in OUTCOME_FIELDS {
        if let Some(value) = record.get_str(field) {
            let v = value.to_ascii_lowercase();
            return Some(
                v.contains("fail") || v == "denied" || v == "invalid" || v == "rejected",
            );
        }
    }
    None
}

impl Rule for FailedLoginRule {
    fn kind(&self) -> RuleKind {
        RuleKind::FailedLogin
    }

    fn evaluate(
        &self,
        record: &Record,
        store: &mut CounterStore,
        config: &RuleConfig,
        _prior: &[ThreatMatch],
    ) -> Option<ThreatMatch> {
        let action = record.action_type()?;
        if !is_login_action(action) {
            return None;
        }
        let failed = match outcome_is_failure(record) {
            Some(failed) => failed,
            None => {
                debug!(action, "login record has no outcome field; rule skipped");
                return None;
            }
        };
        if !failed {
            return None;
        }

        let entity = entity_of(record);
        let count = store.increment(RuleKind::FailedLogin, entity);
        let severity = boundary_severity(
            count,
            config.failed_login_threshold,
            config.escalation_factor,
            Severity::High,
            Severity::Critical,
        )?;

        Some(base_match(
            record,
            RuleKind::FailedLogin,
            severity,
            format!(
                "{count} failed login attempts for user '{entity}' (threshold: {})",
                config.failed_login_threshold
            ),
        ))
    }
}

// ---------------------------------------------------------------------------
// Encryption-count rule
// ---------------------------------------------------------------------------

/// Counts encryption operations per user; fires at the configured
/// threshold (Medium) and again at the escalation boundary (High).
/// Encryption bursts are less conclusively malicious than repeated auth
/// failures, hence the lower baseline.
pub struct EncryptionCountRule;

fn is_encryption_action(action: &str) -> bool {
    action.to_ascii_lowercase().contains("encrypt")
}

impl Rule for EncryptionCountRule {
    fn kind(&self) -> RuleKind {
        RuleKind::EncryptionCount
    }

    fn evaluate(
        &self,
        record: &Record,
        store: &mut CounterStore,
        config: &RuleConfig,
        _prior: &[ThreatMatch],
    ) -> Option<ThreatMatch> {
        let action = record.action_type()?;
        if !is_encryption_action(action) {
            return None;
        }

        let entity = entity_of(record);
        let count = store.increment(RuleKind::EncryptionCount, entity);
        let severity = boundary_severity(
            count,
            config.encryption_count_threshold,
            config.escalation_factor,
            Severity::Medium,
            Severity::High,
        )?;

        Some(base_match(
            record,
            RuleKind::EncryptionCount,
            severity,
            format!(
                "{count} encryption operations for user '{entity}' (threshold: {})",
                config.encryption_count_threshold
            ),
        ))
    }
}

// ---------------------------------------------------------------------------
// Off-hours rule
// ---------------------------------------------------------------------------

/// Flags activity whose timestamp falls outside the business-hours window.
/// Stateless; severity Low, promoted one tier when a counter rule already
/// fired on the same record (the "off-hours AND suspicious volume"
/// compound signal).
pub struct OffHoursRule;

/// True when `hour` falls inside `[start, end)`. A window with
/// `start > end` spans midnight: `[start, 24) ∪ [0, end)`.
fn within_business_hours(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

impl Rule for OffHoursRule {
    fn kind(&self) -> RuleKind {
        RuleKind::OffHoursAccess
    }

    fn evaluate(
        &self,
        record: &Record,
        _store: &mut CounterStore,
        config: &RuleConfig,
        prior: &[ThreatMatch],
    ) -> Option<ThreatMatch> {
        let ts = match record.timestamp() {
            Some(ts) => ts,
            None => {
                debug!("record has no parseable timestamp; off-hours rule skipped");
                return None;
            }
        };
        let hour = ts.hour();
        if within_business_hours(hour, config.business_hours_start, config.business_hours_end) {
            return None;
        }

        let mut severity = Severity::Low;
        if config.off_hours_promotion && !prior.is_empty() {
            severity = severity.promoted();
        }

        Some(base_match(
            record,
            RuleKind::OffHoursAccess,
            severity,
            format!(
                "activity at {:02}:{:02} outside business hours ({:02}:00-{:02}:00)",
                hour,
                ts.minute(),
                config.business_hours_start,
                config.business_hours_end
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> Record {
        Record::from_value(v).unwrap()
    }

    fn failed_login(user: &str) -> Record {
        record(json!({
            "timestamp": "2024-07-10T14:00:00Z",
            "user": user,
            "action": "login",
            "login_result": "failure"
        }))
    }

    #[test]
    fn test_action_classification() {
        assert!(is_login_action("login"));
        assert!(is_login_action("user_logon"));
        assert!(is_login_action("LOGIN_ATTEMPT"));
        assert!(!is_login_action("file_access"));

        assert!(is_encryption_action("encryption"));
        assert!(is_encryption_action("file_encrypt"));
        assert!(!is_encryption_action("decompress"));
    }

    #[test]
    fn test_outcome_classification() {
        let failed = record(json!({"login_result": "FAILED"}));
        assert_eq!(outcome_is_failure(&failed), Some(true));

        let denied = record(json!({"status": "denied"}));
        assert_eq!(outcome_is_failure(&denied), Some(true));

        let ok = record(json!({"result": "success"}));
        assert_eq!(outcome_is_failure(&ok), Some(false));

        let absent = record(json!({"action": "login"}));
        assert_eq!(outcome_is_failure(&absent), None);
    }

    #[test]
    fn test_boundary_severity_exact_crossings_only() {
        let at = |count| boundary_severity(count, 5, 2, Severity::High, Severity::Critical);
        assert_eq!(at(4), None);
        assert_eq!(at(5), Some(Severity::High));
        assert_eq!(at(6), None);
        assert_eq!(at(9), None);
        assert_eq!(at(10), Some(Severity::Critical));
        assert_eq!(at(11), None);
    }

    #[test]
    fn test_failed_login_fires_at_threshold() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rule = FailedLoginRule;

        for _ in 0..4 {
            assert!(rule
                .evaluate(&failed_login("alice"), &mut store, &config, &[])
                .is_none());
        }
        let m = rule
            .evaluate(&failed_login("alice"), &mut store, &config, &[])
            .expect("threshold crossing should fire");
        assert_eq!(m.severity, Severity::High);
        assert_eq!(m.user, "alice");
        assert!(m.details.contains("5 failed login attempts"));
        assert!(m.details.contains("threshold: 5"));
    }

    #[test]
    fn test_failed_login_successful_attempt_does_not_count() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rule = FailedLoginRule;

        let success = record(json!({
            "user": "alice",
            "action": "login",
            "login_result": "success"
        }));
        assert!(rule.evaluate(&success, &mut store, &config, &[]).is_none());
        assert_eq!(store.current(RuleKind::FailedLogin, "alice"), 0);
    }

    #[test]
    fn test_failed_login_missing_outcome_skips_without_counting() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rule = FailedLoginRule;

        let bare = record(json!({"user": "alice", "action": "login"}));
        assert!(rule.evaluate(&bare, &mut store, &config, &[]).is_none());
        assert_eq!(store.current(RuleKind::FailedLogin, "alice"), 0);
    }

    #[test]
    fn test_failed_login_unknown_user_bucket() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rule = FailedLoginRule;

        let anonymous = record(json!({"action": "login", "login_result": "failure"}));
        for _ in 0..5 {
            rule.evaluate(&anonymous, &mut store, &config, &[]);
        }
        assert_eq!(store.current(RuleKind::FailedLogin, UNKNOWN_ENTITY), 5);
    }

    #[test]
    fn test_encryption_severities() {
        let config = RuleConfig {
            encryption_count_threshold: 2,
            ..RuleConfig::default()
        };
        let mut store = CounterStore::new();
        let rule = EncryptionCountRule;
        let rec = record(json!({"user": "bob", "action": "file_encryption"}));

        assert!(rule.evaluate(&rec, &mut store, &config, &[]).is_none());
        let second = rule.evaluate(&rec, &mut store, &config, &[]).unwrap();
        assert_eq!(second.severity, Severity::Medium);
        assert!(rule.evaluate(&rec, &mut store, &config, &[]).is_none());
        let fourth = rule.evaluate(&rec, &mut store, &config, &[]).unwrap();
        assert_eq!(fourth.severity, Severity::High);
    }

    #[test]
    fn test_within_business_hours_window() {
        assert!(within_business_hours(8, 8, 18));
        assert!(within_business_hours(17, 8, 18));
        assert!(!within_business_hours(18, 8, 18));
        assert!(!within_business_hours(2, 8, 18));
    }

    #[test]
    fn test_business_hours_spanning_midnight() {
        assert!(within_business_hours(23, 22, 6));
        assert!(within_business_hours(3, 22, 6));
        assert!(!within_business_hours(12, 22, 6));
    }

    #[test]
    fn test_off_hours_fires_low() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rec = record(json!({
            "timestamp": "2024-07-10T02:00:00Z",
            "user": "carol",
            "action": "file_access"
        }));

        let m = OffHoursRule
            .evaluate(&rec, &mut store, &config, &[])
            .unwrap();
        assert_eq!(m.severity, Severity::Low);
        assert!(m.details.contains("02:00"));
        assert!(m.details.contains("08:00-18:00"));
    }

    #[test]
    fn test_off_hours_promoted_when_prior_match_exists() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rec = record(json!({
            "timestamp": "2024-07-10T02:00:00Z",
            "user": "carol",
            "action": "login",
            "login_result": "failure"
        }));
        let prior = vec![ThreatMatch {
            rule: RuleKind::FailedLogin,
            severity: Severity::High,
            details: String::new(),
            timestamp: String::new(),
            user: "carol".to_string(),
            source: String::new(),
        }];

        let m = OffHoursRule
            .evaluate(&rec, &mut store, &config, &prior)
            .unwrap();
        assert_eq!(m.severity, Severity::Medium);
    }

    #[test]
    fn test_off_hours_promotion_can_be_disabled() {
        let config = RuleConfig {
            off_hours_promotion: false,
            ..RuleConfig::default()
        };
        let mut store = CounterStore::new();
        let rec = record(json!({
            "timestamp": "2024-07-10T02:00:00Z",
            "user": "carol",
            "action": "login",
            "login_result": "failure"
        }));
        let prior = vec![ThreatMatch {
            rule: RuleKind::FailedLogin,
            severity: Severity::High,
            details: String::new(),
            timestamp: String::new(),
            user: "carol".to_string(),
            source: String::new(),
        }];

        let m = OffHoursRule
            .evaluate(&rec, &mut store, &config, &prior)
            .unwrap();
        assert_eq!(m.severity, Severity::Low);
    }

    #[test]
    fn test_off_hours_skips_without_timestamp() {
        let config = RuleConfig::default();
        let mut store = CounterStore::new();
        let rec = record(json!({"user": "carol", "action": "file_access"}));
        assert!(OffHoursRule
            .evaluate(&rec, &mut store, &config, &[])
            .is_none());
    }

    #[test]
    fn test_catalog_order_ends_with_off_hours() {
        let kinds: Vec<_> = catalog().iter().map(|r| r.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::FailedLogin,
                RuleKind::EncryptionCount,
                RuleKind::OffHoursAccess
            ]
        );
    }
}
