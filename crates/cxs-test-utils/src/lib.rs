//! Test utilities for CXS crates.

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("runs.csv");
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// A well-formed eight-column ledger record.
pub fn valid_record() -> Vec<String> {
    [
        "2025-01-15T10:30:00Z",
        "session-001",
        "cycle-001",
        "process.contract",
        "agent-x",
        "1500",
        "completed",
        "done",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// [`valid_record`] with the fields at the given positions replaced.
pub fn valid_record_with(overrides: &[(usize, &str)]) -> Vec<String> {
    let mut record = valid_record();
    for &(index, value) in overrides {
        record[index] = value.to_string();
    }
    record
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
