//! Aggregation of trace events into collapsed stacks and metrics.
//!
//! This module transforms decoded entry/exit events into:
//! - The active call stack and its joined path
//! - Cumulative durations per call path
//! - Collapsed stack format (for flamegraph tooling)
//! - Hot path and duration statistics

pub mod call_stack;
pub mod frequency;
pub mod metrics;
pub mod stack_builder;

// Re-export main types and functions
pub use call_stack::{CallStack, StackFrame};
pub use frequency::FrequencyTable;
pub use metrics::{
    calculate_duration_distribution, calculate_hot_paths, generate_text_summary,
    DurationDistribution, HotPath,
};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack, StackOrder};
