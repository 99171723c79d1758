//! Decoder for single trace records.
//!
//! A record is one tab-separated line:
//!
//! ```text
//! depth  fn-number  is-exit  seconds  [memory  name  ...]
//! 2      4          0        0.000312 434896   require  1  /app/vendor/autoload.php ...
//! 3      5          1        0.000360 435784
//! ```
//!
//! Exit records stop after the timestamp. Entry records carry the memory
//! usage (ignored) and the function name.

use crate::utils::config::{FIELD_SEPARATOR, MICROS_PER_SECOND, STRAY_NAME_PREFIX};
use crate::utils::error::DecodeError;

/// Whether a record opens or closes a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Entry,
    Exit,
}

/// One decoded trace record
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,

    /// Elapsed time since trace start, in microseconds
    pub timestamp_us: f64,

    /// Function name, only present on entry records
    pub name: Option<String>,
}

impl Event {
    pub fn entry(name: impl Into<String>, timestamp_us: f64) -> Self {
        Self {
            kind: EventKind::Entry,
            timestamp_us,
            name: Some(name.into()),
        }
    }

    pub fn exit(timestamp_us: f64) -> Self {
        Self {
            kind: EventKind::Exit,
            timestamp_us,
            name: None,
        }
    }

    pub fn is_exit(&self) -> bool {
        self.kind == EventKind::Exit
    }
}

/// Stateless record decoder
///
/// **Public** - used by the trace reader for every body line
#[derive(Debug, Clone, Copy)]
pub struct SampleDecoder {
    strip_stray_prefix: bool,
}

impl Default for SampleDecoder {
    fn default() -> Self {
        Self {
            strip_stray_prefix: true,
        }
    }
}

impl SampleDecoder {
    pub fn new(strip_stray_prefix: bool) -> Self {
        Self { strip_stray_prefix }
    }

    /// Decode one line (without its terminator) into an event
    ///
    /// # Errors
    /// * `DecodeError::MissingField` - fewer fields than the record kind needs
    /// * `DecodeError::NumberFormat` - depth or time is not a number
    /// * `DecodeError::Encoding` - function name is not UTF-8
    pub fn decode(&self, line: &[u8]) -> Result<Event, DecodeError> {
        let mut fields = line.split(|&b| b == FIELD_SEPARATOR);

        // A lone field is a missing record, not a malformed depth
        let depth = next_field(&mut fields, "depth")?;
        next_field(&mut fields, "function number")?;
        parse_number::<i64>(depth, "depth")?;

        let is_exit = next_field(&mut fields, "is-exit flag")?;
        let kind = if is_exit == b"0" {
            EventKind::Entry
        } else {
            EventKind::Exit
        };

        let seconds: f64 = parse_number(next_field(&mut fields, "time")?, "time")?;
        let timestamp_us = seconds * MICROS_PER_SECOND;

        if kind == EventKind::Exit {
            return Ok(Event::exit(timestamp_us));
        }

        next_field(&mut fields, "memory usage")?;
        let raw_name = next_field(&mut fields, "function name")?;

        Ok(Event::entry(self.decode_name(raw_name)?, timestamp_us))
    }

    fn decode_name(&self, raw: &[u8]) -> Result<String, DecodeError> {
        let raw = match raw.split_first() {
            Some((&STRAY_NAME_PREFIX, rest)) if self.strip_stray_prefix => rest,
            _ => raw,
        };
        Ok(std::str::from_utf8(raw)?.to_owned())
    }
}

/// Decode a line with the default decoder settings
///
/// **Public** - convenience wrapper around `SampleDecoder::decode`
pub fn decode_sample(line: &[u8]) -> Result<Event, DecodeError> {
    SampleDecoder::default().decode(line)
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a [u8]>,
    name: &'static str,
) -> Result<&'a [u8], DecodeError> {
    fields.next().ok_or(DecodeError::MissingField(name))
}

fn parse_number<T: std::str::FromStr>(raw: &[u8], field: &'static str) -> Result<T, DecodeError> {
    std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DecodeError::NumberFormat {
            field,
            value: String::from_utf8_lossy(raw).into_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_entry_line() {
        let line = b"2\t4\t0\t0.000312\t434896\trequire\t1\t/app/vendor/autoload.php\t/app/public/index.php\t32";
        let event = decode_sample(line).unwrap();

        assert_eq!(event.kind, EventKind::Entry);
        assert_eq!(event.name.as_deref(), Some("require"));
        assert_eq!(event.timestamp_us, 312.0);
    }

    #[test]
    fn test_decode_exit_line() {
        let event = decode_sample(b"3\t5\t1\t0.000360\t435784").unwrap();

        assert!(event.is_exit());
        assert_eq!(event.name, None);
        assert_eq!(event.timestamp_us, 360.0);
    }

    #[test]
    fn test_exit_line_ignores_trailing_fields() {
        let event = decode_sample(b"3\t5\t1\t0.000001\t435784\t\xfe\xfe").unwrap();
        assert!(event.is_exit());
    }

    #[test]
    fn test_entry_without_name_is_missing_field() {
        let err = decode_sample(b"2\t4\t0\t0.000312\t434896").unwrap_err();
        assert_eq!(err, DecodeError::MissingField("function name"));
    }

    #[test]
    fn test_blank_line_is_missing_field() {
        let err = decode_sample(b"").unwrap_err();
        assert_eq!(err, DecodeError::MissingField("function number"));
    }

    #[test]
    fn test_bad_depth_is_number_format() {
        let err = decode_sample(b"x\t4\t0\t0.1\t1\tmain").unwrap_err();
        assert!(matches!(err, DecodeError::NumberFormat { field: "depth", .. }));
    }

    #[test]
    fn test_stray_prefix_is_stripped() {
        let event = decode_sample(b"1\t0\t0\t0.5\t1\t\xffstrlen").unwrap();
        assert_eq!(event.name.as_deref(), Some("strlen"));
    }

    #[test]
    fn test_stray_prefix_kept_when_disabled() {
        let err = SampleDecoder::new(false)
            .decode(b"1\t0\t0\t0.5\t1\t\xffstrlen")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Encoding(_)));
    }

    #[test]
    fn test_other_invalid_bytes_are_not_stripped() {
        let err = decode_sample(b"1\t0\t0\t0.5\t1\t\xfestrlen").unwrap_err();
        assert!(matches!(err, DecodeError::Encoding(_)));
    }
}
