//! Owned, serialisable copies of assembled events.
//!
//! The parser hands out borrowed views that are invalidated by the next
//! `next_event` call. A snapshot outlives that and is what the exporters
//! write.

use super::event::EventId;

/// One field with its raw and interpreted values.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldSnapshot {
    pub name: String,
    pub value: String,
    pub interpreted: String,
}

/// One record of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RecordSnapshot {
    /// Numeric record type, if it could be resolved.
    pub record_type: Option<u32>,
    /// Record type name, e.g. `SYSCALL` or `UNKNOWN[1334]`.
    pub type_name: String,
    /// The raw line.
    pub text: String,
    pub fields: Vec<FieldSnapshot>,
}

/// A complete event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct EventSnapshot {
    pub id: EventId,
    /// Local time of the event with milliseconds.
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub records: Vec<RecordSnapshot>,
}

impl EventSnapshot {
    /// Iterate over every field of every record as `(record, field)`.
    pub fn fields(&self) -> impl Iterator<Item = (&RecordSnapshot, &FieldSnapshot)> {
        self.records
            .iter()
            .flat_map(|r| r.fields.iter().map(move |f| (r, f)))
    }
}
