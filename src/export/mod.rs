//! Export of event snapshots to CSV and JSON files.

pub mod csv_export;
pub mod json_export;

use crate::util::error::{AuparseError, Result};
use std::path::Path;

/// Check that an export target can be created before any events are
/// collected.
///
/// A bare file name resolves against the current directory.
///
/// # Errors
/// [`AuparseError::Export`] if the parent directory does not exist or is
/// not a directory.
pub fn validate_export_path(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::env::current_dir().map_err(|e| {
            AuparseError::Export(format!("Cannot resolve parent directory: {e}"))
        })?,
    };
    if !parent.exists() {
        return Err(AuparseError::Export(format!(
            "Directory {} does not exist",
            parent.display()
        )));
    }
    if !parent.is_dir() {
        return Err(AuparseError::Export(format!(
            "Parent {} is not a directory",
            parent.display()
        )));
    }
    Ok(())
}
