//! Output writers for collapsed stacks.
//!
//! This module handles writing the folded stack listing to stdout or disk.

pub mod folded;

// Re-export main functions
pub use folded::{write_folded, write_folded_file};
