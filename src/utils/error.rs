//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::str::Utf8Error;
use thiserror::Error;

/// Errors that can occur while decoding a single trace record
///
/// All of these are recovered at the line boundary by the trace reader.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid number in {field} field: {value:?}")]
    NumberFormat { field: &'static str, value: String },

    #[error("function name is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
}

/// Fatal errors for a whole collapse run
#[derive(Error, Debug)]
pub enum CollapseError {
    #[error("no line containing the start marker found after {lines_scanned} lines")]
    StartMarkerNotFound { lines_scanned: usize },

    #[error("input ended before any trace content was found")]
    PrematureEndOfInput,

    #[error("failed to read trace input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
