//! Engine-specific error types.

use thiserror::Error;

/// Errors that abort a scan.
///
/// Per-record field issues never surface here; they are absorbed as
/// diagnostics so a scan over an imperfect log still completes.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The record source itself failed while being iterated.
    #[error("record source failed: {0}")]
    Source(#[from] logscan_parser::ParseError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, EngineError>;
