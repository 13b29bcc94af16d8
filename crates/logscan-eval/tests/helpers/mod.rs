use logscan_eval::{DetectionEngine, ResultSet, RuleConfig};
use logscan_parser::Record;
use serde_json::{json, Value};

pub fn record(v: Value) -> Record {
    Record::from_value(v).unwrap()
}

pub fn failed_login(user: &str, timestamp: &str) -> Record {
    record(json!({
        "timestamp": timestamp,
        "user": user,
        "source": "10.0.0.1",
        "action": "login",
        "login_result": "failure"
    }))
}

pub fn encryption(user: &str, timestamp: &str) -> Record {
    record(json!({
        "timestamp": timestamp,
        "user": user,
        "source": "10.0.0.1",
        "action": "file_encryption"
    }))
}

pub fn analyze(records: Vec<Record>) -> ResultSet {
    analyze_with(records, RuleConfig::default())
}

pub fn analyze_with(records: Vec<Record>, config: RuleConfig) -> ResultSet {
    let mut engine = DetectionEngine::new(config);
    engine.analyze_records(records, None)
}
