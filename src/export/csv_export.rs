//! CSV export for event snapshots.
//!
//! Writes one row per field so that every event, record and field value
//! can be filtered in a spreadsheet.

use crate::core::snapshot::EventSnapshot;
use crate::util::error::{AuparseError, Result};
use std::path::Path;

/// Export the given events to a CSV file at `path`.
///
/// Columns: Time, Serial, Record, Type, Field, Value, Interpreted. `Record`
/// is the zero-based record index within the event.
///
/// # Errors
/// Returns [`AuparseError::Export`] if the file cannot be created or written.
pub fn export_csv(events: &[EventSnapshot], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AuparseError::Export(format!("Failed to create CSV file: {e}")))?;

    writer
        .write_record([
            "Time",
            "Serial",
            "Record",
            "Type",
            "Field",
            "Value",
            "Interpreted",
        ])
        .map_err(|e| AuparseError::Export(format!("Failed to write CSV header: {e}")))?;

    let mut rows = 0usize;
    for event in events {
        let serial = event.id.serial.to_string();
        for (idx, record) in event.records.iter().enumerate() {
            let record_idx = idx.to_string();
            for field in &record.fields {
                writer
                    .write_record([
                        event.time.as_str(),
                        &serial,
                        &record_idx,
                        &record.type_name,
                        &field.name,
                        &field.value,
                        &field.interpreted,
                    ])
                    .map_err(|e| AuparseError::Export(format!("Failed to write CSV row: {e}")))?;
                rows += 1;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AuparseError::Export(format!("Failed to flush CSV: {e}")))?;

    tracing::info!(
        "Exported {} events ({rows} fields) to CSV: {}",
        events.len(),
        path.display()
    );
    Ok(())
}
