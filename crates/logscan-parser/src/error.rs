//! Parse-specific error types.

use thiserror::Error;

/// Errors that can occur while reading records from a tabular source.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying reader failed.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The input had no header row to map columns from.
    #[error("input is empty: no header row")]
    MissingHeader,

    /// A JSON value could not be turned into a record because it is not
    /// an object.
    #[error("expected a JSON object for a record")]
    NotAnObject,

    /// A line of NDJSON input failed to parse.
    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A line of NDJSON input parsed, but was not an object.
    #[error("line {line}: expected a JSON object")]
    JsonNotObject { line: usize },
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ParseError>;
