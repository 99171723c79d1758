//! Streaming trace reading.
//!
//! Drives the decoder line by line, feeds the call stack and aggregator,
//! and routes skipped lines to a diagnostics sink.

pub mod diagnostics;
pub mod trace_reader;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, WriterSink};
pub use trace_reader::{collapse_trace, CollapseResult, CollapseState, TraceReader, TraceStats};
