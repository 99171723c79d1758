use xtrace_collapse::parser::{decode_sample, EventKind, SampleDecoder};
use xtrace_collapse::utils::error::DecodeError;

#[test]
fn test_function_entry_line() {
    let line = b"2\t4\t0\t0.000312\t434896\trequire\t1\t/app/vendor/autoload.php\t/app/public/index.php\t32";
    let event = decode_sample(line).unwrap();

    assert_eq!(event.kind, EventKind::Entry);
    assert_eq!(event.name.as_deref(), Some("require"));
    assert_eq!(event.timestamp_us, 312.0);
}

#[test]
fn test_function_exit_line() {
    let event = decode_sample(b"3\t5\t1\t0.000360\t435784").unwrap();

    assert_eq!(event.kind, EventKind::Exit);
    assert_eq!(event.name, None);
    assert_eq!(event.timestamp_us, 360.0);
}

#[test]
fn test_any_non_zero_flag_is_exit() {
    let event = decode_sample(b"3\t5\tR\t0.5\t435784").unwrap();
    assert_eq!(event.kind, EventKind::Exit);
}

#[test]
fn test_missing_time_field() {
    assert_eq!(
        decode_sample(b"3\t5\t1").unwrap_err(),
        DecodeError::MissingField("time")
    );
}

#[test]
fn test_non_numeric_time() {
    let err = decode_sample(b"3\t5\t1\tsoon\t1").unwrap_err();
    assert_eq!(
        err,
        DecodeError::NumberFormat {
            field: "time",
            value: "soon".to_string()
        }
    );
}

#[test]
fn test_invalid_name_encoding() {
    let err = decode_sample(b"1\t0\t0\t0.1\t1\tfo\xc3o").unwrap_err();
    assert!(matches!(err, DecodeError::Encoding(_)));
}

#[test]
fn test_name_is_owned_copy() {
    let mut line = b"1\t0\t0\t0.1\t1\tstrlen\t1".to_vec();
    let event = SampleDecoder::default().decode(&line).unwrap();

    line.iter_mut().for_each(|b| *b = b'z');
    assert_eq!(event.name.as_deref(), Some("strlen"));
}
