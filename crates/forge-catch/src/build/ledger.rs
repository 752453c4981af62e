//! Per-run record of emitted units
//!
//! A ledger belongs to exactly one run. Hosts that run the generator
//! repeatedly (watch mode, incremental rebuilds) create a new one each time.

use std::collections::HashSet;

/// Unit keys already written in this run
#[derive(Debug, Default)]
pub struct EmissionLedger {
    keys: HashSet<String>,
    order: Vec<String>,
}

impl EmissionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a unit still needs to be written
    pub fn should_emit(&self, key: &str) -> bool {
        !self.keys.contains(key)
    }

    /// Record a successful write
    pub fn record_emitted(&mut self, key: &str) {
        if self.keys.insert(key.to_string()) {
            self.order.push(key.to_string());
        }
    }

    /// Keys in the order they were written
    pub fn emitted(&self) -> &[String] {
        &self.order
    }

    /// Number of units written
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing was written yet
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
