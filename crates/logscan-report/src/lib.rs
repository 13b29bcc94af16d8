//! # logscan-report
//!
//! HTML report rendering for scan results: a standalone page with summary
//! boxes per severity tier and one table per non-empty tier, in the shape
//! security teams expect from the scanner's reports.
//!
//! Rendering never fails the caller: if the template engine errors, a
//! minimal fallback page is produced instead, so a completed scan always
//! yields a report.

use std::path::Path;

use askama::Template;
use thiserror::Error;
use tracing::error;

use logscan_eval::{ResultSet, ThreatMatch};

/// Metadata about one completed scan, shown in the report header.
#[derive(Debug, Clone)]
pub struct ScanInfo {
    /// Name of the analyzed file.
    pub filename: String,
    /// Human-readable scan date.
    pub scan_date: String,
    /// Number of records consumed.
    pub records_analyzed: u64,
    /// Wall-clock scan duration in seconds.
    pub duration_secs: f64,
}

/// Errors from persisting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ReportError>;

/// One severity tier as the template consumes it.
struct TierSection<'a> {
    title: &'static str,
    css: &'static str,
    count: usize,
    threats: &'a [ThreatMatch],
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    info: &'a ScanInfo,
    duration: String,
    total: usize,
    tiers: Vec<TierSection<'a>>,
}

/// Render the full HTML report.
///
/// Falls back to [`basic_report`] when template rendering fails, mirroring
/// the scanner's "always produce a report" contract.
pub fn render(results: &ResultSet, info: &ScanInfo) -> String {
    let template = ReportTemplate {
        info,
        duration: format!("{:.2}", info.duration_secs),
        total: results.total(),
        tiers: vec![
            TierSection {
                title: "Critical",
                css: "critical",
                count: results.critical.len(),
                threats: &results.critical,
            },
            TierSection {
                title: "High",
                css: "high",
                count: results.high.len(),
                threats: &results.high,
            },
            TierSection {
                title: "Medium",
                css: "medium",
                count: results.medium.len(),
                threats: &results.medium,
            },
            TierSection {
                title: "Low",
                css: "low",
                count: results.low.len(),
                threats: &results.low,
            },
        ],
    };

    match template.render() {
        Ok(html) => html,
        Err(err) => {
            error!(%err, "template rendering failed; falling back to basic report");
            basic_report(results, info)
        }
    }
}

/// Render and write the report to `path`.
pub fn write_report<P: AsRef<Path>>(path: P, results: &ResultSet, info: &ScanInfo) -> Result<()> {
    std::fs::write(path, render(results, info))?;
    Ok(())
}

/// Minimal fallback page: scan metadata plus per-tier counts.
fn basic_report(results: &ResultSet, info: &ScanInfo) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>Security scan report (basic)</title></head>\n\
         <body>\n<h1>Security scan report (basic format)</h1>\n\
         <p>Date: {}</p>\n<p>File: {}</p>\n\
         <h2>Threat summary:</h2>\n<ul>\n\
         <li>Critical: {}</li>\n<li>High: {}</li>\n\
         <li>Medium: {}</li>\n<li>Low: {}</li>\n</ul>\n\
         <p>Note: an error occurred while rendering the full report.</p>\n\
         </body>\n</html>\n",
        info.scan_date,
        info.filename,
        results.critical.len(),
        results.high.len(),
        results.medium.len(),
        results.low.len(),
    )
}
