//! Build collapsed stack format from aggregated call durations.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "{main};require;strlen 12.000000"
//! This means: {main} called require which called strlen, and those calls
//! took 12 microseconds in total.

use super::frequency::FrequencyTable;
use log::debug;
use std::cmp::Ordering;
use std::fmt;

/// A single collapsed stack entry
///
/// **Public** - used by the output writer and summary
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Total microseconds spent in calls completing under this stack
    pub weight: f64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight: f64) -> Self {
        Self { stack, weight }
    }

    /// Number of frames on the stack
    pub fn depth(&self) -> usize {
        self.stack.split(';').count()
    }
}

impl fmt::Display for CollapsedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.6}", self.stack, self.weight)
    }
}

/// Ordering applied to the collapsed stacks before output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackOrder {
    /// Whatever order the table yields
    #[default]
    Unordered,
    /// Heaviest first, ties broken by path
    Weight,
    /// Lexicographic by path
    Path,
}

/// Build collapsed stacks from a finished frequency table
///
/// **Public** - main entry point for stack building
///
/// # Arguments
/// * `table` - Aggregated durations, consumed
/// * `order` - Output ordering
///
/// # Returns
/// Vector of collapsed stacks, one per unique call path
pub fn build_collapsed_stacks(table: FrequencyTable, order: StackOrder) -> Vec<CollapsedStack> {
    let mut stacks: Vec<CollapsedStack> = table
        .finalize()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    match order {
        StackOrder::Unordered => {}
        StackOrder::Weight => stacks.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.stack.cmp(&b.stack))
        }),
        StackOrder::Path => stacks.sort_by(|a, b| a.stack.cmp(&b.stack)),
    }

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> FrequencyTable {
        let mut table = FrequencyTable::new();
        table.record("{main}".to_string(), 302.0);
        table.record("{main};b".to_string(), 68.0);
        table.record("{main};a".to_string(), 189.0);
        table
    }

    #[test]
    fn test_collapsed_stack_display() {
        let stack = CollapsedStack::new("main;execute;strlen".to_string(), 1000.0);
        assert_eq!(stack.to_string(), "main;execute;strlen 1000.000000");
    }

    #[test]
    fn test_depth() {
        let stack = CollapsedStack::new("{main};b;d".to_string(), 1.0);
        assert_eq!(stack.depth(), 3);
    }

    #[test]
    fn test_weight_order() {
        let stacks = build_collapsed_stacks(sample_table(), StackOrder::Weight);
        let names: Vec<_> = stacks.iter().map(|s| s.stack.as_str()).collect();
        assert_eq!(names, vec!["{main}", "{main};a", "{main};b"]);
    }

    #[test]
    fn test_path_order() {
        let stacks = build_collapsed_stacks(sample_table(), StackOrder::Path);
        let names: Vec<_> = stacks.iter().map(|s| s.stack.as_str()).collect();
        assert_eq!(names, vec!["{main}", "{main};a", "{main};b"]);
        assert_eq!(stacks[2].weight, 68.0);
    }
}
