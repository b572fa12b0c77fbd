//! JSON export for event snapshots.
//!
//! Each event becomes one object carrying its identity, local time, node
//! and every record with raw and interpreted field values.

use crate::core::snapshot::EventSnapshot;
use crate::util::error::{AuparseError, Result};
use std::io::Write;
use std::path::Path;

/// Export the given events to a JSON file at `path`.
///
/// Output is a pretty-printed JSON array of [`EventSnapshot`] objects in
/// the order given. An empty slice writes `[]`.
///
/// # Errors
/// Returns [`AuparseError::Export`] if the file cannot be created or written.
pub fn export_json(events: &[EventSnapshot], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| {
        AuparseError::Export(format!("Failed to create JSON file {}: {e}", path.display()))
    })?;

    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, events)
        .map_err(|e| AuparseError::Export(format!("Failed to write JSON events: {e}")))?;
    writer
        .flush()
        .map_err(|e| AuparseError::Export(format!("Failed to flush JSON output: {e}")))?;

    let records: usize = events.iter().map(|e| e.records.len()).sum();
    tracing::info!(
        "Exported {} event(s) with {records} record(s) to JSON: {}",
        events.len(),
        path.display()
    );
    Ok(())
}
