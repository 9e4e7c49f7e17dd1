//! Error handling integration tests.
//!
//! These tests verify that meaningful errors are returned for various
//! failure conditions.

use std::path::{Path, PathBuf};

use bitrate_graph::{AnalysisOptions, BitrateError, ProbeFormat, analyze_bitrate, analyze_many, parser};

#[test]
fn missing_ffprobe_binary() {
    let options = AnalysisOptions::new()
        .with_ffprobe_path("this_probe_does_not_exist")
        .with_sidecar(false);

    let error = analyze_bitrate("input.mp4", &options).unwrap_err();
    match &error {
        BitrateError::Analysis { path, source } => {
            assert_eq!(path, Path::new("input.mp4"));
            assert!(
                matches!(**source, BitrateError::ProbeSpawn { .. }),
                "Expected ProbeSpawn, got {source:?}",
            );
        }
        other => panic!("Expected Analysis, got {other:?}"),
    }

    let error_message = error.to_string();
    assert!(
        error_message.starts_with("input.mp4: Failed to run this_probe_does_not_exist"),
        "Error message should name the file and the program: {error_message}",
    );
}

#[test]
fn batch_stops_at_first_failure() {
    let options = AnalysisOptions::new()
        .with_ffprobe_path("this_probe_does_not_exist")
        .with_sidecar(false);

    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let first = directory.path().join("first.mp4");
    let second = directory.path().join("second.mp4");
    std::fs::write(&first, b"").expect("Failed to create input");
    std::fs::write(&second, b"").expect("Failed to create input");

    let error = analyze_many(&[&first, &second], &options).unwrap_err();
    match error {
        BitrateError::Analysis { path, .. } => assert_eq!(path, first),
        other => panic!("Expected Analysis, got {other:?}"),
    }
}

#[test]
fn batch_reports_missing_inputs_before_running() {
    let options = AnalysisOptions::new()
        .with_ffprobe_path("this_probe_does_not_exist")
        .with_sidecar(false);

    let error = analyze_many(&["missing_one.mp4", "missing_two.mkv"], &options).unwrap_err();
    match error {
        BitrateError::MissingInput { paths } => assert_eq!(
            paths,
            vec![PathBuf::from("missing_one.mp4"), PathBuf::from("missing_two.mkv")]
        ),
        other => panic!("Expected MissingInput, got {other:?}"),
    }
}

#[test]
fn missing_input_lists_every_path() {
    let error = BitrateError::MissingInput {
        paths: vec![PathBuf::from("a.mp4"), PathBuf::from("dir/b.mkv")],
    };
    assert_eq!(
        error.to_string(),
        "The following input files could not be found: a.mp4, dir/b.mkv"
    );
}

#[test]
fn invalid_record_message() {
    let error = BitrateError::InvalidRecord {
        index: 3,
        timestamp: 1.5,
        previous: Some(2.0),
    };
    assert_eq!(
        error.to_string(),
        "Invalid record 3: timestamp 1.5 (previous 2)"
    );

    let first = BitrateError::InvalidRecord {
        index: 0,
        timestamp: -1.0,
        previous: None,
    };
    assert!(first.to_string().ends_with("(previous none)"));
}

#[test]
fn limit_error_messages() {
    let overflow = BitrateError::SizeOverflow { index: 7 };
    assert_eq!(
        overflow.to_string(),
        "Invalid record 7: window byte total overflows"
    );

    let distant = BitrateError::TooManyWindows {
        index: 1,
        timestamp: 1e15,
        limit: 10_000_000,
    };
    assert_eq!(
        distant.to_string(),
        "Invalid record 1: timestamp 1000000000000000 lies beyond the 10000000-window limit"
    );
}

#[test]
fn parse_error_names_format() {
    let error = parser::parse("not json", ProbeFormat::Json, "codec_name").unwrap_err();
    let error_message = error.to_string();
    assert!(
        error_message.starts_with("Failed to parse json probe output"),
        "Error message should name the format: {error_message}",
    );
}

#[test]
fn invalid_window_from_options() {
    let options = AnalysisOptions::new().with_window_seconds(0.0);
    let raw = r#"<ffprobe><frames><frame key_frame="1" best_effort_timestamp_time="0" pkt_size="1"/></frames><streams><stream codec_name="h264"/></streams></ffprobe>"#;

    let result = bitrate_graph::analyze_probe_output(raw, ProbeFormat::Xml, &options);
    assert!(matches!(result, Err(BitrateError::InvalidWindow(w)) if w == 0.0));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: BitrateError = io.into();
    assert!(matches!(error, BitrateError::IoError(_)));
    assert!(error.to_string().contains("denied"));
}
