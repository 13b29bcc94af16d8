//! Engine configuration with documented defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default count of failed logins before a threat is raised.
pub const DEFAULT_FAILED_LOGIN_THRESHOLD: u32 = 5;
/// Default count of encryption operations before a threat is raised.
pub const DEFAULT_ENCRYPTION_COUNT_THRESHOLD: u32 = 10;
/// Default start of the business-hours window (hour of day).
pub const DEFAULT_BUSINESS_HOURS_START: u32 = 8;
/// Default end of the business-hours window (hour of day, exclusive).
pub const DEFAULT_BUSINESS_HOURS_END: u32 = 18;
/// Default multiple of a threshold at which severity escalates one tier.
pub const DEFAULT_ESCALATION_FACTOR: u32 = 2;

/// Configuration for one detection engine, immutable after construction.
///
/// The escalation factor and off-hours promotion flag are policy knobs
/// rather than hard-wired constants, so hosts can align the engine with
/// whatever reference behavior they need to match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Failed-login count at which the failed-login rule fires.
    #[serde(default = "default_failed_login_threshold")]
    pub failed_login_threshold: u32,

    /// Encryption-operation count at which the encryption rule fires.
    #[serde(default = "default_encryption_count_threshold")]
    pub encryption_count_threshold: u32,

    /// First hour of day considered normal activity time.
    #[serde(default = "default_business_hours_start")]
    pub business_hours_start: u32,

    /// First hour of day past the normal window (exclusive bound).
    #[serde(default = "default_business_hours_end")]
    pub business_hours_end: u32,

    /// Severity escalates one tier when a counter reaches
    /// `escalation_factor` times its threshold.
    #[serde(default = "default_escalation_factor")]
    pub escalation_factor: u32,

    /// Promote an off-hours match one tier when a counter rule also fired
    /// on the same record.
    #[serde(default = "default_true")]
    pub off_hours_promotion: bool,
}

fn default_failed_login_threshold() -> u32 {
    DEFAULT_FAILED_LOGIN_THRESHOLD
}
fn default_encryption_count_threshold() -> u32 {
    DEFAULT_ENCRYPTION_COUNT_THRESHOLD
}
fn default_business_hours_start() -> u32 {
    DEFAULT_BUSINESS_HOURS_START
}
fn default_business_hours_end() -> u32 {
    DEFAULT_BUSINESS_HOURS_END
}
fn default_escalation_factor() -> u32 {
    DEFAULT_ESCALATION_FACTOR
}
fn default_true() -> bool {
    true
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            failed_login_threshold: DEFAULT_FAILED_LOGIN_THRESHOLD,
            encryption_count_threshold: DEFAULT_ENCRYPTION_COUNT_THRESHOLD,
            business_hours_start: DEFAULT_BUSINESS_HOURS_START,
            business_hours_end: DEFAULT_BUSINESS_HOURS_END,
            escalation_factor: DEFAULT_ESCALATION_FACTOR,
            off_hours_promotion: true,
        }
    }
}

impl RuleConfig {
    /// Replace invalid values with the documented defaults.
    ///
    /// A misconfigured scan should degrade, not fail: zero thresholds,
    /// out-of-range hours, and an escalation factor below 2 each fall back
    /// with a warning.
    pub fn sanitized(mut self) -> Self {
        if self.failed_login_threshold == 0 {
            warn!(
                value = self.failed_login_threshold,
                "invalid failed_login threshold, using default"
            );
            self.failed_login_threshold = DEFAULT_FAILED_LOGIN_THRESHOLD;
        }
        if self.encryption_count_threshold == 0 {
            warn!(
                value = self.encryption_count_threshold,
                "invalid encryption_count threshold, using default"
            );
            self.encryption_count_threshold = DEFAULT_ENCRYPTION_COUNT_THRESHOLD;
        }
        if self.business_hours_start > 23 {
            warn!(
                value = self.business_hours_start,
                "invalid business_hours start, using default"
            );
            self.business_hours_start = DEFAULT_BUSINESS_HOURS_START;
        }
        if self.business_hours_end > 23 {
            warn!(
                value = self.business_hours_end,
                "invalid business_hours end, using default"
            );
            self.business_hours_end = DEFAULT_BUSINESS_HOURS_END;
        }
        if self.escalation_factor < 2 {
            warn!(
                value = self.escalation_factor,
                "invalid escalation factor, using default"
            );
            self.escalation_factor = DEFAULT_ESCALATION_FACTOR;
        }
        self
    }
}
