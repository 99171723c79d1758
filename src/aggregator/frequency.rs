//! Cumulative duration per joined call path.

use log::trace;
use std::collections::HashMap;

/// Mapping from collapsed path to total microseconds spent on it
#[derive(Debug, Default, Clone)]
pub struct FrequencyTable {
    totals: HashMap<String, f64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one completed call's duration to its path
    pub fn record(&mut self, path: String, duration_us: f64) {
        trace!("{} += {}", path, duration_us);
        *self.totals.entry(path).or_insert(0.0) += duration_us;
    }

    pub fn get(&self, path: &str) -> Option<f64> {
        self.totals.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Consume the table, yielding `(path, total_us)` in no particular order
    pub fn finalize(self) -> impl Iterator<Item = (String, f64)> {
        self.totals.into_iter()
    }
}
