//! # logscan-parser
//!
//! Readers for tabular security/audit logs. This crate turns CSV or NDJSON
//! input into a stream of [`Record`]s: free-form field maps with typed
//! accessors for the columns the detection engine cares about (timestamp,
//! user, source, action type).
//!
//! Readers are single-pass iterators of `Result<Record, ParseError>`; the
//! consumer decides whether a failing item is fatal. Field access degrades
//! gracefully: a missing column is `None`, never an error.
//!
//! ```rust
//! use logscan_parser::read_csv;
//!
//! let input = "timestamp,user,action\n2024-07-10T02:00:00Z,alice,login\n";
//! let records: Vec<_> = read_csv(input.as_bytes())
//!     .unwrap()
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(records[0].user(), Some("alice"));
//! ```

pub mod error;
pub mod reader;
pub mod record;

pub use error::{ParseError, Result};
pub use reader::{read_csv, read_csv_path, read_ndjson, CsvReader, NdjsonReader};
pub use record::Record;
