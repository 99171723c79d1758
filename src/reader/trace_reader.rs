//! Line-oriented driver turning a trace stream into aggregated durations.
//!
//! States: seeking the `TRACE START` line, collecting body records, done.
//! The body ends at end of input or at the first line starting with a tab
//! (the trailer line carrying the final timestamp and memory).

use super::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::aggregator::{CallStack, FrequencyTable};
use crate::parser::{Event, EventKind, SampleDecoder};
use crate::utils::config::{CollapseConfig, FIELD_SEPARATOR, START_MARKER};
use crate::utils::error::CollapseError;
use log::{debug, info, warn};
use std::io::{self, BufRead, Read};

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceStats {
    /// Every line read, header included
    pub lines_read: usize,
    pub entries: usize,
    pub exits: usize,

    /// Lines reported to diagnostics (decode failures and overlong lines)
    pub malformed_lines: usize,
    pub unmatched_exits: usize,
    pub negative_durations: usize,

    /// Calls still open when the body ended
    pub unfinished_calls: usize,
    pub max_depth: usize,

    /// Body reading stopped on an I/O error
    pub truncated: bool,
}

/// Output of a finished run
#[derive(Debug)]
pub struct CollapseResult {
    pub table: FrequencyTable,
    pub stats: TraceStats,
}

/// Call stack plus aggregate, fed one event at a time
#[derive(Debug, Default)]
pub struct CollapseState {
    stack: CallStack,
    table: FrequencyTable,
    stats: TraceStats,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route an event: entries push, exits pop and record
    pub fn apply(&mut self, event: Event) {
        match event.kind {
            EventKind::Entry => {
                self.stats.entries += 1;
                self.stack
                    .push(event.name.unwrap_or_default(), event.timestamp_us);
            }
            EventKind::Exit => {
                self.stats.exits += 1;
                match self.stack.pop(event.timestamp_us) {
                    Some((path, duration_us)) => {
                        if duration_us < 0.0 {
                            debug!("negative duration {} for {}", duration_us, path);
                            self.stats.negative_durations += 1;
                        }
                        self.table.record(path, duration_us);
                    }
                    None => self.stats.unmatched_exits += 1,
                }
            }
        }
    }

    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn finish(mut self) -> CollapseResult {
        self.stats.unfinished_calls = self.stack.depth();
        self.stats.max_depth = self.stack.max_depth();
        if let Some(top) = self.stack.top() {
            debug!(
                "{} calls still open at end of trace, discarded (innermost: {})",
                self.stats.unfinished_calls, top.name
            );
        }

        CollapseResult {
            table: self.table,
            stats: self.stats,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    SeekingStart,
    Collecting,
    Done,
}

enum LineRead {
    Line,
    TooLong { length: usize, has_marker: bool },
    Eof,
}

/// Streaming trace reader
///
/// **Public** - main entry point for collapsing a trace
pub struct TraceReader<R: BufRead> {
    input: R,
    config: CollapseConfig,
    decoder: SampleDecoder,
    buf: Vec<u8>,
    line_number: usize,
    state: ReaderState,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(input: R, config: CollapseConfig) -> Self {
        let decoder = SampleDecoder::new(config.strip_stray_prefix);
        Self {
            input,
            config,
            decoder,
            buf: Vec::new(),
            line_number: 0,
            state: ReaderState::SeekingStart,
        }
    }

    /// Read the whole trace and aggregate it
    ///
    /// # Errors
    /// * `CollapseError::PrematureEndOfInput` - input has no lines
    /// * `CollapseError::StartMarkerNotFound` - no `TRACE START` line
    /// * `CollapseError::Io` - read failure before the trace body
    pub fn collapse<S: DiagnosticSink>(mut self, sink: &mut S) -> Result<CollapseResult, CollapseError> {
        self.seek_start()?;

        let mut state = CollapseState::new();
        while self.state == ReaderState::Collecting {
            self.collect_line(&mut state, sink);
        }

        let mut result = state.finish();
        result.stats.lines_read = self.line_number;
        if result.stats.truncated {
            warn!("trace body ended early after line {}", self.line_number);
        }

        info!(
            "Collapsed {} calls into {} unique stacks ({} lines skipped)",
            result.stats.exits - result.stats.unmatched_exits,
            result.table.len(),
            result.stats.malformed_lines
        );

        Ok(result)
    }

    fn seek_start(&mut self) -> Result<(), CollapseError> {
        while self.state == ReaderState::SeekingStart {
            match self.read_line()? {
                LineRead::Eof if self.line_number == 0 => {
                    return Err(CollapseError::PrematureEndOfInput)
                }
                LineRead::Eof => {
                    return Err(CollapseError::StartMarkerNotFound {
                        lines_scanned: self.line_number,
                    })
                }
                LineRead::TooLong { has_marker, .. } => {
                    if has_marker {
                        debug!("trace body starts after line {}", self.line_number);
                        self.state = ReaderState::Collecting;
                    }
                }
                LineRead::Line => {
                    if contains(&self.buf, START_MARKER) {
                        debug!("trace body starts after line {}", self.line_number);
                        self.state = ReaderState::Collecting;
                    }
                }
            }
        }
        Ok(())
    }

    fn collect_line<S: DiagnosticSink>(&mut self, state: &mut CollapseState, sink: &mut S) {
        let read = match self.read_line() {
            Ok(read) => read,
            Err(e) => {
                warn!("failed to read line {}: {}", self.line_number + 1, e);
                state.stats.truncated = true;
                self.state = ReaderState::Done;
                return;
            }
        };

        match read {
            LineRead::Eof => self.state = ReaderState::Done,
            LineRead::TooLong { length, .. } => {
                state.stats.malformed_lines += 1;
                let kind = DiagnosticKind::LineTooLong {
                    length,
                    limit: self.config.max_line_length,
                };
                sink.report(Diagnostic::new(self.line_number, kind, &self.buf));
            }
            LineRead::Line if self.buf.first() == Some(&FIELD_SEPARATOR) => {
                debug!("trace body ends at line {}", self.line_number);
                self.state = ReaderState::Done;
            }
            LineRead::Line => match self.decoder.decode(&self.buf) {
                Ok(event) => state.apply(event),
                Err(e) => {
                    state.stats.malformed_lines += 1;
                    sink.report(Diagnostic::new(
                        self.line_number,
                        DiagnosticKind::Decode(e),
                        &self.buf,
                    ));
                }
            },
        }
    }

    /// Read the next line into `buf`, without its terminator.
    ///
    /// At most `max_line_length + 1` bytes are buffered; the rest of an
    /// overlong line is consumed and only scanned for the start marker.
    fn read_line(&mut self) -> io::Result<LineRead> {
        self.buf.clear();
        let max = self.config.max_line_length;
        let limit = (max as u64).saturating_add(1);
        let n = self
            .input
            .by_ref()
            .take(limit)
            .read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(LineRead::Eof);
        }
        self.line_number += 1;

        let mut terminated = self.buf.last() == Some(&b'\n');
        if terminated {
            self.buf.pop();
        } else if self.buf.len() > max && self.buf.last() == Some(&b'\r') {
            // CRLF line exactly at the limit, its `\n` is still unread
            let next = self.input.fill_buf()?.first().copied();
            match next {
                Some(b'\n') => {
                    self.input.consume(1);
                    terminated = true;
                }
                None => terminated = true,
                Some(_) => {}
            }
        }

        if (terminated || self.buf.len() <= max) && self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }

        if !terminated && self.buf.len() > max {
            let (skipped, has_marker) = self.drain_line()?;
            return Ok(LineRead::TooLong {
                length: self.buf.len() + skipped,
                has_marker,
            });
        }
        Ok(LineRead::Line)
    }

    /// Skip the remainder of the current line.
    ///
    /// Returns the skipped length and whether the whole line, buffered
    /// prefix included, contains the start marker.
    fn drain_line(&mut self) -> io::Result<(usize, bool)> {
        let keep = START_MARKER.len() - 1;
        let mut has_marker = contains(&self.buf, START_MARKER);
        let mut tail = self.buf[self.buf.len().saturating_sub(keep)..].to_vec();
        let mut skipped = 0;

        loop {
            let (consumed, done) = {
                let available = self.input.fill_buf()?;
                if available.is_empty() {
                    return Ok((skipped, has_marker));
                }
                let (consumed, done) = match available.iter().position(|&b| b == b'\n') {
                    Some(pos) => (pos + 1, true),
                    None => (available.len(), false),
                };
                if !has_marker {
                    tail.extend_from_slice(&available[..consumed - usize::from(done)]);
                    has_marker = contains(&tail, START_MARKER);
                    let cut = tail.len().saturating_sub(keep);
                    tail.drain(..cut);
                }
                (consumed, done)
            };
            self.input.consume(consumed);
            if done {
                return Ok((skipped + consumed - 1, has_marker));
            }
            skipped += consumed;
        }
    }
}

/// Collapse a whole trace with the given configuration
///
/// **Public** - convenience wrapper around `TraceReader`
pub fn collapse_trace<R: BufRead, S: DiagnosticSink>(
    input: R,
    config: CollapseConfig,
    sink: &mut S,
) -> Result<CollapseResult, CollapseError> {
    TraceReader::new(input, config).collapse(sink)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
