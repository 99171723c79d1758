//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod collapse;

// Re-export main command functions
pub use collapse::{execute_collapse, validate_args, CollapseArgs, CollapseOutcome};
