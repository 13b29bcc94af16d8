//! YAML configuration loading with default fallback.
//!
//! The on-disk shape keeps the scanner's historical layout:
//!
//! ```yaml
//! threat_detection:
//!   threshold:
//!     failed_login: 5
//!     encryption_count: 10
//!   business_hours:
//!     start: 8
//!     end: 18
//! ```
//!
//! A missing file is created with defaults. Any other failure (unreadable
//! file, malformed YAML) falls back to defaults with a warning; a scan
//! never fails over configuration.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use logscan_eval::{
    RuleConfig, DEFAULT_BUSINESS_HOURS_END, DEFAULT_BUSINESS_HOURS_START,
    DEFAULT_ENCRYPTION_COUNT_THRESHOLD, DEFAULT_ESCALATION_FACTOR,
    DEFAULT_FAILED_LOGIN_THRESHOLD,
};

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileConfig {
    #[serde(default)]
    threat_detection: ThreatDetection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ThreatDetection {
    #[serde(default)]
    threshold: Thresholds,
    #[serde(default)]
    business_hours: BusinessHours,
    #[serde(default)]
    escalation_factor: Option<u32>,
    #[serde(default)]
    off_hours_promotion: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Thresholds {
    failed_login: Option<u32>,
    encryption_count: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BusinessHours {
    start: Option<u32>,
    end: Option<u32>,
}

impl FileConfig {
    /// The defaults, with every key spelled out so the generated file is
    /// self-documenting.
    fn with_defaults() -> Self {
        FileConfig {
            threat_detection: ThreatDetection {
                threshold: Thresholds {
                    failed_login: Some(DEFAULT_FAILED_LOGIN_THRESHOLD),
                    encryption_count: Some(DEFAULT_ENCRYPTION_COUNT_THRESHOLD),
                },
                business_hours: BusinessHours {
                    start: Some(DEFAULT_BUSINESS_HOURS_START),
                    end: Some(DEFAULT_BUSINESS_HOURS_END),
                },
                escalation_factor: Some(DEFAULT_ESCALATION_FACTOR),
                off_hours_promotion: Some(true),
            },
        }
    }

    fn into_rule_config(self) -> RuleConfig {
        let td = self.threat_detection;
        RuleConfig {
            failed_login_threshold: td
                .threshold
                .failed_login
                .unwrap_or(DEFAULT_FAILED_LOGIN_THRESHOLD),
            encryption_count_threshold: td
                .threshold
                .encryption_count
                .unwrap_or(DEFAULT_ENCRYPTION_COUNT_THRESHOLD),
            business_hours_start: td
                .business_hours
                .start
                .unwrap_or(DEFAULT_BUSINESS_HOURS_START),
            business_hours_end: td.business_hours.end.unwrap_or(DEFAULT_BUSINESS_HOURS_END),
            escalation_factor: td.escalation_factor.unwrap_or(DEFAULT_ESCALATION_FACTOR),
            off_hours_promotion: td.off_hours_promotion.unwrap_or(true),
        }
        .sanitized()
    }
}

/// Load configuration from `path`, creating the file with defaults when it
/// does not exist.
pub fn load_or_create(path: &Path) -> RuleConfig {
    if !path.exists() {
        warn!(
            path = %path.display(),
            "configuration file not found; creating with defaults"
        );
        if let Err(err) = write_default(path) {
            warn!(%err, "could not write default configuration");
        }
        return RuleConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<FileConfig>(&contents) {
            Ok(file) => {
                debug!(path = %path.display(), "configuration loaded");
                file.into_rule_config()
            }
            Err(err) => {
                warn!(%err, "invalid configuration; using defaults");
                RuleConfig::default()
            }
        },
        Err(err) => {
            warn!(%err, "could not read configuration; using defaults");
            RuleConfig::default()
        }
    }
}

fn write_default(path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let yaml = serde_yaml::to_string(&FileConfig::with_defaults())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, yaml)
}
