//! Unified error types for auparse.
//!
//! All fallible operations throughout the crate return `Result<T, AuparseError>`.
//! Running out of input is not an error: traversal calls report exhaustion
//! as `Ok(false)` or `None`, and malformed record text degrades to unset
//! attributes instead of failing.

use std::path::PathBuf;

/// Unified error type used throughout auparse.
///
/// Each variant captures enough context to produce an actionable message for
/// the caller or for log output.
#[derive(Debug, thiserror::Error)]
pub enum AuparseError {
    /// A file-backed source could not be opened.
    #[error("Failed to open audit source '{}': {source}", path.display())]
    SourceOpen {
        /// The path that could not be opened.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The caller passed an argument the operation cannot accept
    /// (unknown operator, missing value, no search rules, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A search rule was added with a combination mode that conflicts with
    /// the mode already established for the rule list.
    #[error("Search rule conflict: cannot add an {requested} rule to an {established} rule list")]
    RuleConflict {
        /// Mode the rule list already uses.
        established: String,
        /// Mode requested by the rejected rule.
        requested: String,
    },

    /// The requested feature is not implemented by this parser.
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// `auditd.conf` could not be read or did not yield a usable log path.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export (CSV or JSON) failed, typically an I/O error.
    #[error("Export failed: {0}")]
    Export(String),

    /// Catch-all for I/O errors while reading a source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuparseError>;

/// Build an [`AuparseError::InvalidArgument`] from any message.
///
/// # Example
/// ```
/// use auparse::util::error::invalid_arg;
/// let err = invalid_arg("no search rules have been added");
/// assert!(err.to_string().contains("no search rules"));
/// ```
pub fn invalid_arg(msg: impl Into<String>) -> AuparseError {
    AuparseError::InvalidArgument(msg.into())
}
