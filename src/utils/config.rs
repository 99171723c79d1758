//! Configuration and constants for the collapser.

/// Substring marking the line right before the trace body
pub const START_MARKER: &[u8] = b"TRACE START";

pub const FIELD_SEPARATOR: u8 = b'\t';
pub const PATH_SEPARATOR: char = ';';

/// Trace timestamps are seconds, folded output is microseconds
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Leading byte some trace producers inject in front of function names.
///
/// Only this exact byte is stripped, and only in first position.
pub const STRAY_NAME_PREFIX: u8 = 0xFF;

/// Longest line (without terminator) accepted by the reader
pub const DEFAULT_MAX_LINE_LENGTH: usize = 4096;

/// How much of an offending line is echoed in a diagnostic
pub const DIAGNOSTIC_PREVIEW_LEN: usize = 256;

/// Runtime options for a collapse run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseConfig {
    /// Lines longer than this are skipped without decoding
    pub max_line_length: usize,

    /// Strip `STRAY_NAME_PREFIX` from the front of function names
    pub strip_stray_prefix: bool,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            strip_stray_prefix: true,
        }
    }
}

impl CollapseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    pub fn with_stray_prefix_stripping(mut self, enabled: bool) -> Self {
        self.strip_stray_prefix = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = CollapseConfig::new()
            .with_max_line_length(16)
            .with_stray_prefix_stripping(false);

        assert_eq!(config.max_line_length, 16);
        assert!(!config.strip_stray_prefix);
        assert_eq!(CollapseConfig::default().max_line_length, DEFAULT_MAX_LINE_LENGTH);
    }
}
