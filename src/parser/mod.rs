//! Trace record parsing.
//!
//! This module handles:
//! - Splitting a raw line into its tab-separated fields
//! - Classifying the record as call entry or exit
//! - Converting timestamps to microseconds

pub mod sample;

// Re-export main types
pub use sample::{decode_sample, Event, EventKind, SampleDecoder};
