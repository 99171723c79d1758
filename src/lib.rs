//! xtrace-collapse
//!
//! Converts tab-delimited function traces (entry/exit records with
//! timestamps, as written by Xdebug's computerized trace format) into
//! collapsed stacks: one line per distinct call path with the total
//! microseconds spent in calls completing under it.
//!
//! This crate provides the core implementation for the
//! `stackcollapse-xtrace` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! stackcollapse-xtrace < trace.xt > trace.folded
//! inferno-flamegraph < trace.folded > trace.svg
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod reader;
pub mod utils;
