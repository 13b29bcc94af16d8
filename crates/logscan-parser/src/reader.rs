//! CSV and NDJSON readers producing `Record` streams.
//!
//! Both readers are line-oriented single-pass iterators yielding
//! `Result<Record, ParseError>`, so the consumer decides how to treat a
//! failing source. CSV splitting is quote-aware (RFC-4180-style `""`
//! escapes) but deliberately small: header row first, one record per
//! subsequent non-empty line.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ParseError, Result};
use crate::record::Record;

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Streaming CSV reader. Construct via [`read_csv`] or [`read_csv_path`].
pub struct CsvReader<R: BufRead> {
    headers: Vec<String>,
    lines: io::Lines<R>,
    line_no: usize,
    done: bool,
}

/// Open a CSV file and return a record iterator over its rows.
pub fn read_csv_path<P: AsRef<Path>>(path: P) -> Result<CsvReader<BufReader<File>>> {
    let file = File::open(path)?;
    read_csv(BufReader::new(file))
}

/// Read CSV from any buffered reader.
///
/// The first non-empty line is taken as the header row; every following
/// non-empty line becomes one [`Record`] keyed by the headers. Returns
/// `ParseError::MissingHeader` when the input holds no header at all.
pub fn read_csv<R: BufRead>(reader: R) -> Result<CsvReader<R>> {
    let mut lines = reader.lines();
    let mut line_no = 0;
    loop {
        match lines.next() {
            None => return Err(ParseError::MissingHeader),
            Some(Err(e)) => return Err(ParseError::Io(e)),
            Some(Ok(raw)) => {
                line_no += 1;
                let line = clean_line(&raw, line_no);
                if line.trim().is_empty() {
                    continue;
                }
                let headers = split_line(line)
                    .into_iter()
                    .map(|h| h.trim().to_string())
                    .collect();
                return Ok(CsvReader {
                    headers,
                    lines,
                    line_no,
                    done: false,
                });
            }
        }
    }
}

impl<R: BufRead> CsvReader<R> {
    /// Column names from the header row.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row_to_record(&self, line: &str) -> Record {
        let fields = split_line(line);
        if fields.len() > self.headers.len() {
            debug!(
                line = self.line_no,
                extra = fields.len() - self.headers.len(),
                "row has more fields than headers; extras dropped"
            );
        }
        let mut object = Map::new();
        for (header, value) in self.headers.iter().zip(fields) {
            // Empty cells are treated as absent fields.
            if !value.is_empty() {
                object.insert(header.clone(), Value::String(value));
            }
        }
        Record::from_object(object)
    }
}

impl<R: BufRead> Iterator for CsvReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                None => return None,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(ParseError::Io(e)));
                }
                Some(Ok(raw)) => {
                    self.line_no += 1;
                    let line = raw.trim_end_matches('\r');
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(Ok(self.row_to_record(line)));
                }
            }
        }
    }
}

/// Strip a UTF-8 BOM from the first line and any trailing CR.
fn clean_line(raw: &str, line_no: usize) -> &str {
    let line = raw.trim_end_matches('\r');
    if line_no == 1 {
        line.strip_prefix('\u{feff}').unwrap_or(line)
    } else {
        line
    }
}

/// Quote-aware CSV field splitter. Handles commas inside quotes and
/// doubled-quote escapes; quotes themselves are not kept.
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

// ---------------------------------------------------------------------------
// NDJSON
// ---------------------------------------------------------------------------

/// Streaming newline-delimited-JSON reader. Each non-empty line must be a
/// JSON object.
pub struct NdjsonReader<R: BufRead> {
    lines: io::Lines<R>,
    line_no: usize,
    done: bool,
}

/// Read NDJSON records from any buffered reader.
pub fn read_ndjson<R: BufRead>(reader: R) -> NdjsonReader<R> {
    NdjsonReader {
        lines: reader.lines(),
        line_no: 0,
        done: false,
    }
}

impl<R: BufRead> Iterator for NdjsonReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            match self.lines.next() {
                None => return None,
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(ParseError::Io(e)));
                }
                Some(Ok(raw)) => {
                    self.line_no += 1;
                    let line = raw.trim();
                    if line.is_empty() {
                        continue;
                    }
                    let value: Value = match serde_json::from_str(line) {
                        Ok(v) => v,
                        Err(source) => {
                            return Some(Err(ParseError::Json {
                                line: self.line_no,
                                source,
                            }));
                        }
                    };
                    return Some(match value {
                        Value::Object(fields) => Ok(Record::from_object(fields)),
                        _ => Err(ParseError::JsonNotObject { line: self.line_no }),
                    });
                }
            }
        }
    }
}
