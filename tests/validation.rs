//! Input validation integration tests.

use std::path::PathBuf;

use bitrate_graph::{
    BitrateError,
    validation::{ensure_inputs_exist, missing_inputs},
};

#[test]
fn existing_inputs_pass() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let first = directory.path().join("a.mp4");
    let second = directory.path().join("b.mkv");
    std::fs::write(&first, b"a").expect("Failed to write input");
    std::fs::write(&second, b"b").expect("Failed to write input");

    assert!(missing_inputs(&[&first, &second]).is_empty());
    assert!(ensure_inputs_exist(&[first, second]).is_ok());
}

#[test]
fn every_missing_input_is_reported_in_order() {
    let directory = tempfile::tempdir().expect("Failed to create temp dir");
    let present = directory.path().join("present.mp4");
    std::fs::write(&present, b"x").expect("Failed to write input");
    let absent_one = directory.path().join("absent_one.mp4");
    let absent_two = directory.path().join("absent_two.mkv");

    let inputs = vec![absent_one.clone(), present, absent_two.clone()];
    assert_eq!(missing_inputs(&inputs), vec![absent_one.clone(), absent_two.clone()]);

    match ensure_inputs_exist(&inputs) {
        Err(BitrateError::MissingInput { paths }) => {
            assert_eq!(paths, vec![absent_one, absent_two]);
        }
        other => panic!("Expected MissingInput, got {other:?}"),
    }
}

#[test]
fn no_inputs_is_not_an_error() {
    let inputs: Vec<PathBuf> = Vec::new();
    assert!(ensure_inputs_exist(&inputs).is_ok());
}
