//! Integration tests for error type construction and display.

use auparse::util::error::{invalid_arg, AuparseError};
use std::path::PathBuf;

#[test]
fn source_open_error_names_the_path() {
    let err = AuparseError::SourceOpen {
        path: PathBuf::from("/var/log/audit/audit.log"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no access"),
    };
    let msg = err.to_string();
    assert!(
        msg.contains("/var/log/audit/audit.log"),
        "Should contain path: {msg}"
    );
    assert!(msg.contains("no access"), "Should contain cause: {msg}");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn invalid_argument_preserves_message() {
    let err = invalid_arg("unknown search operator '~'");
    let msg = err.to_string();
    assert!(msg.contains("operator '~'"), "Should contain detail: {msg}");
}

#[test]
fn rule_conflict_names_both_modes() {
    let err = AuparseError::RuleConflict {
        established: "AND".into(),
        requested: "OR".into(),
    };
    let msg = err.to_string();
    assert!(
        msg.contains("AND") && msg.contains("OR"),
        "Should name both modes: {msg}"
    );
}

#[test]
fn export_error_preserves_message() {
    let err = AuparseError::Export("disk full".into());
    let msg = err.to_string();
    assert!(msg.contains("disk full"), "Should contain detail: {msg}");
}

#[test]
fn io_error_converts() {
    let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated log");
    let err: AuparseError = io_err.into();
    let msg = err.to_string();
    assert!(msg.contains("truncated log"), "Should preserve IO error: {msg}");
}

#[test]
fn not_supported_error_displays() {
    let err = AuparseError::NotSupported("regular expression search".into());
    let msg = err.to_string();
    assert!(
        msg.contains("regular expression"),
        "Should contain detail: {msg}"
    );
}

#[test]
fn error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AuparseError>();
}
