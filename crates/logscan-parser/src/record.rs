//! Record model with open-ended field access.
//!
//! A `Record` is one row of a tabular security log: a free-form mapping of
//! column names to values, with typed accessors for the handful of fields
//! the detection rules care about. Column naming in real-world exports is
//! inconsistent, so each accessor probes a short list of conventional names
//! before giving up.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::error::{ParseError, Result};

/// Field names probed, in order, when looking for the record timestamp.
const TIMESTAMP_FIELDS: &[&str] = &["timestamp", "@timestamp", "time", "date"];

/// Field names probed for the acting user identity.
const USER_FIELDS: &[&str] = &["user", "username", "account"];

/// Field names probed for the record origin.
const SOURCE_FIELDS: &[&str] = &["source", "source_ip", "ip", "host"];

/// Field names probed for the action tag.
const ACTION_FIELDS: &[&str] = &["action", "type", "event_type"];

/// One row of input, immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Build a record from a JSON value. Fails unless the value is an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Record { fields }),
            _ => Err(ParseError::NotAnObject),
        }
    }

    /// Build a record directly from a field map.
    pub fn from_object(fields: Map<String, Value>) -> Self {
        Record { fields }
    }

    /// Open-ended field lookup by exact column name.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value of a field, if present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// The acting user, if the record names one.
    pub fn user(&self) -> Option<&str> {
        self.first_str(USER_FIELDS)
    }

    /// The record origin (IP, host, ...), if named.
    pub fn source(&self) -> Option<&str> {
        self.first_str(SOURCE_FIELDS)
    }

    /// The action tag identifying what happened.
    pub fn action_type(&self) -> Option<&str> {
        self.first_str(ACTION_FIELDS)
    }

    /// The raw (unparsed) timestamp field, if present.
    pub fn raw_timestamp(&self) -> Option<&str> {
        self.first_str(TIMESTAMP_FIELDS)
    }

    /// The record timestamp, parsed as UTC.
    ///
    /// Accepts RFC 3339 and the common naive formats
    /// (`2024-07-10T12:30:00`, `2024-07-10 12:30:00`, with or without
    /// fractional seconds); naive values are assumed UTC.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.raw_timestamp().and_then(parse_timestamp)
    }

    /// Display form of the timestamp: the parsed value formatted as
    /// `YYYY-MM-DD HH:MM:SS`, or the raw field verbatim when unparseable.
    pub fn timestamp_display(&self) -> Option<String> {
        match self.timestamp() {
            Some(ts) => Some(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => self.raw_timestamp().map(str::to_string),
        }
    }

    /// Access the underlying field map.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// First string value among `names`, trying exact keys first and then a
    /// case-insensitive pass (CSV exports disagree on header casing).
    fn first_str(&self, names: &[&str]) -> Option<&str> {
        for name in names {
            if let Some(s) = self.get_str(name) {
                return Some(s);
            }
        }
        for name in names {
            for (key, value) in &self.fields {
                if key.eq_ignore_ascii_case(name) {
                    if let Some(s) = value.as_str() {
                        return Some(s);
                    }
                }
            }
        }
        None
    }
}

/// Parse a timestamp string. Tries RFC 3339 with timezone, then naive
/// ISO-ish formats assumed to be UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn record(v: Value) -> Record {
        Record::from_value(v).unwrap()
    }

    #[test]
    fn test_from_value_rejects_non_object() {
        assert!(Record::from_value(json!([1, 2, 3])).is_err());
        assert!(Record::from_value(json!("row")).is_err());
    }

    #[test]
    fn test_typed_accessors() {
        let r = record(json!({
            "timestamp": "2024-07-10T02:30:00Z",
            "user": "alice",
            "source": "10.0.0.5",
            "action": "login"
        }));
        assert_eq!(r.user(), Some("alice"));
        assert_eq!(r.source(), Some("10.0.0.5"));
        assert_eq!(r.action_type(), Some("login"));
        assert_eq!(r.timestamp().unwrap().hour(), 2);
    }

    #[test]
    fn test_accessor_fallback_names() {
        let r = record(json!({
            "username": "bob",
            "ip": "192.168.1.9",
            "type": "file_access"
        }));
        assert_eq!(r.user(), Some("bob"));
        assert_eq!(r.source(), Some("192.168.1.9"));
        assert_eq!(r.action_type(), Some("file_access"));
    }

    #[test]
    fn test_case_insensitive_headers() {
        let r = record(json!({"Timestamp": "2024-07-10 14:00:00", "User": "carol"}));
        assert_eq!(r.user(), Some("carol"));
        assert_eq!(r.timestamp().unwrap().hour(), 14);
    }

    #[test]
    fn test_missing_fields() {
        let r = record(json!({"action": "login"}));
        assert_eq!(r.user(), None);
        assert_eq!(r.source(), None);
        assert!(r.timestamp().is_none());
        assert!(r.timestamp_display().is_none());
    }

    #[test]
    fn test_naive_timestamp_assumed_utc() {
        let r = record(json!({"timestamp": "2024-07-10 12:30:00"}));
        assert_eq!(r.timestamp().unwrap().timestamp(), 1720614600);
    }

    #[test]
    fn test_fractional_seconds() {
        let r = record(json!({"timestamp": "2024-07-10T12:30:00.250"}));
        assert_eq!(r.timestamp().unwrap().timestamp(), 1720614600);
    }

    #[test]
    fn test_timestamp_display_falls_back_to_raw() {
        let r = record(json!({"timestamp": "yesterday-ish"}));
        assert!(r.timestamp().is_none());
        assert_eq!(r.timestamp_display().as_deref(), Some("yesterday-ish"));
    }

    #[test]
    fn test_timestamp_display_formats_parsed() {
        let r = record(json!({"timestamp": "2024-07-10T02:30:00Z"}));
        assert_eq!(
            r.timestamp_display().as_deref(),
            Some("2024-07-10 02:30:00")
        );
    }
}
