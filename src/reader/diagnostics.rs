//! Reports for trace lines that were skipped.
//!
//! Diagnostics never go to the folded output. The CLI writes them to
//! stderr; tests collect them into a `Vec`.

use crate::utils::config::DIAGNOSTIC_PREVIEW_LEN;
use crate::utils::error::DecodeError;
use log::debug;
use std::fmt;
use std::io::Write;

/// Why a line was skipped
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticKind {
    Decode(DecodeError),
    LineTooLong { length: usize, limit: usize },
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Decode(err) => write!(f, "{}", err),
            DiagnosticKind::LineTooLong { length, limit } => {
                write!(f, "line too long: {} bytes (limit {})", length, limit)
            }
        }
    }
}

/// One skipped line
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number in the input
    pub line_number: usize,
    pub kind: DiagnosticKind,

    /// Offending content, lossily decoded and cut to a preview length
    pub raw: String,
}

impl Diagnostic {
    pub fn new(line_number: usize, kind: DiagnosticKind, raw: &[u8]) -> Self {
        let preview = &raw[..raw.len().min(DIAGNOSTIC_PREVIEW_LEN)];
        Self {
            line_number,
            kind,
            raw: String::from_utf8_lossy(preview).into_owned(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}\n{}", self.line_number, self.kind, self.raw)
    }
}

/// Destination for skipped-line reports
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Writes each report as a human-readable block
///
/// **Public** - the CLI wraps stderr in this
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for WriterSink<W> {
    fn report(&mut self, diagnostic: Diagnostic) {
        debug!("skipped line {}: {}", diagnostic.line_number, diagnostic.kind);
        // Best effort: a failing diagnostics channel must not stop the run
        let _ = writeln!(self.writer, "#### ERROR ####\n{}", diagnostic);
    }
}
