//! Per-(rule, entity) counter state for one scan.

use std::collections::HashMap;

use crate::rules::RuleKind;

/// Composite key attributing a counter to one rule and one entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    pub rule: RuleKind,
    pub entity: String,
}

/// Running counters keyed by (rule, entity).
///
/// Owned exclusively by one `DetectionEngine`; counters live for the
/// duration of one scan and are reset only by constructing a new engine.
/// Memory grows with the number of distinct keys observed, not with
/// record count.
#[derive(Debug, Default)]
pub struct CounterStore {
    counters: HashMap<CounterKey, u64>,
}

impl CounterStore {
    pub fn new() -> Self {
        CounterStore::default()
    }

    /// Bump the counter for `(rule, entity)` and return the updated count.
    /// Unseen keys start at zero, so the first increment returns 1.
    pub fn increment(&mut self, rule: RuleKind, entity: &str) -> u64 {
        let count = self
            .counters
            .entry(CounterKey {
                rule,
                entity: entity.to_string(),
            })
            .or_insert(0);
        *count += 1;
        *count
    }

    /// Read-only peek; returns 0 for unseen keys.
    pub fn current(&self, rule: RuleKind, entity: &str) -> u64 {
        self.counters
            .get(&CounterKey {
                rule,
                entity: entity.to_string(),
            })
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct (rule, entity) pairs observed (for monitoring).
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
