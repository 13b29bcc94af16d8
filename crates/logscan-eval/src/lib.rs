//! # logscan-eval
//!
//! Single-pass threat detection over tabular security-log records.
//!
//! The engine applies a fixed catalog of heuristic rules (repeated failed
//! logins, encryption bursts, off-hours activity) to an ordered record
//! stream, maintaining per-(rule, entity) counters and partitioning matches
//! into four severity tiers. Time and memory stay linear: one pass over the
//! input, state proportional to distinct entities.
//!
//! ## Architecture
//!
//! - **Rule catalog** (stateless dispatch, stateful counters): each rule
//!   sees one record plus the shared counter store and emits at most one
//!   match; evaluation order is fixed so multi-match output is stable.
//! - **Counter store**: per-(rule, entity) running counts, owned by one
//!   engine, reset only by building a new engine.
//! - **Result aggregator**: severity-partitioned buckets preserving
//!   detection order, snapshot-able mid-scan.
//!
//! ## Quick Start
//!
//! ```rust
//! use logscan_eval::{DetectionEngine, RuleConfig};
//! use logscan_parser::Record;
//! use serde_json::json;
//!
//! let mut engine = DetectionEngine::new(RuleConfig::default());
//!
//! let records = (0..5).map(|_| {
//!     Record::from_value(json!({
//!         "timestamp": "2024-07-10T14:00:00Z",
//!         "user": "alice",
//!         "action": "login",
//!         "login_result": "failure"
//!     }))
//!     .unwrap()
//! });
//!
//! let results = engine.analyze_records(records, None);
//! assert_eq!(results.high.len(), 1);
//! assert!(results.high[0].details.contains("threshold: 5"));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod result;
pub mod rules;
pub mod state;

pub use config::{
    RuleConfig, DEFAULT_BUSINESS_HOURS_END, DEFAULT_BUSINESS_HOURS_START,
    DEFAULT_ENCRYPTION_COUNT_THRESHOLD, DEFAULT_ESCALATION_FACTOR,
    DEFAULT_FAILED_LOGIN_THRESHOLD,
};
pub use engine::{DetectionEngine, ScanDiagnostics};
pub use error::{EngineError, Result};
pub use result::{ResultAggregator, ResultSet, Severity, ThreatMatch};
pub use rules::{Rule, RuleKind, UNKNOWN_ENTITY};
pub use state::{CounterKey, CounterStore};
