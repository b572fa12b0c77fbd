//! Event assembly and cursor navigation.
//!
//! [`AuParser`] reads raw lines from a [`Source`], groups consecutive lines
//! that share one `audit(sec.milli:serial)` stamp into an event, and exposes
//! three nested cursors: event, record within the event, field within the
//! record. Search operations live in [`super::search`].

use super::event::{extract_timestamp, EventId};
use super::event_list::EventList;
use super::field::Field;
use super::record::Record;
use super::rule::{RuleList, StopPoint};
use super::snapshot::{EventSnapshot, FieldSnapshot, RecordSnapshot};
use super::source::{LineSource, Source};
use crate::interpret::{interpret_field, IdentityCache};
use crate::lookup::msg_types::msg_type_display;
use crate::util::error::{invalid_arg, Result};
use crate::util::time::{audit_datetime, format_event_time};
use chrono::{DateTime, Utc};

/// Parser state for one audit source.
///
/// All traversal is single-threaded. The parser owns its records, the
/// one-line lookahead, the search rules and the identity cache.
#[derive(Debug)]
pub struct AuParser {
    source: LineSource,
    /// First line of the next event, read while finding the end of this one.
    saved_line: Option<String>,
    pub(super) events: EventList,
    pub(super) rules: RuleList,
    pub(super) stop: StopPoint,
    find_name: Option<String>,
    identity: IdentityCache,
}

impl AuParser {
    /// Create a parser over `source` using the system account database for
    /// uid/gid names.
    ///
    /// # Errors
    /// Fails if a file-backed source cannot be opened.
    pub fn new(source: Source) -> Result<Self> {
        Self::with_identity(source, IdentityCache::default())
    }

    /// Create a parser with a caller-supplied identity cache.
    ///
    /// # Errors
    /// Fails if a file-backed source cannot be opened.
    pub fn with_identity(source: Source, identity: IdentityCache) -> Result<Self> {
        tracing::debug!("Opening audit source {source:?}");
        Ok(Self {
            source: LineSource::open(source)?,
            saved_line: None,
            events: EventList::new(),
            rules: RuleList::new(),
            stop: StopPoint::default(),
            find_name: None,
            identity,
        })
    }

    /// Rewind to the beginning of the source.
    ///
    /// Drops the current event, the lookahead line and the remembered find
    /// name. Search rules are kept. Stream sources cannot be rewound; the
    /// call still succeeds.
    pub fn reset(&mut self) -> Result<()> {
        self.source.rewind();
        self.saved_line = None;
        self.events.clear();
        self.find_name = None;
        tracing::debug!("Parser reset");
        Ok(())
    }

    // ── Event traversal ─────────────────────────────────────────────────

    /// Assemble the next event.
    ///
    /// Returns `Ok(false)` once the source is exhausted. On an I/O error the
    /// partially built event is discarded.
    ///
    /// # Errors
    /// I/O failures from the source.
    pub fn next_event(&mut self) -> Result<bool> {
        self.events.clear();
        let result = self.assemble_event();
        if result.is_err() {
            self.events.clear();
        }
        result
    }

    fn assemble_event(&mut self) -> Result<bool> {
        let mut next = match self.saved_line.take() {
            Some(line) => Some(line),
            None => self.source.next_line()?,
        };

        while let Some(line) = next {
            match extract_timestamp(&line) {
                None if self.events.is_empty() => {
                    tracing::trace!("Skipping line outside any event: {line:?}");
                }
                None => self.events.append(line),
                Some(id) if self.events.is_empty() => {
                    self.events.set_id(id);
                    self.events.append(line);
                }
                Some(id) => {
                    let continues = self.events.id().is_some_and(|cur| cur.same_event(&id));
                    if !continues {
                        self.saved_line = Some(line);
                        break;
                    }
                    self.events.append(line);
                }
            }
            next = self.source.next_line()?;
        }

        self.events.rewind();
        if let Some(id) = self.events.id() {
            tracing::trace!("Assembled event {id} with {} record(s)", self.events.len());
        }
        Ok(!self.events.is_empty())
    }

    fn ensure_event(&mut self) -> Result<bool> {
        if self.events.is_empty() {
            return self.next_event();
        }
        Ok(true)
    }

    // ── Record traversal ────────────────────────────────────────────────

    /// Move to the first record of the current event, loading the next
    /// event if none is loaded.
    pub fn first_record(&mut self) -> Result<bool> {
        if !self.ensure_event()? {
            return Ok(false);
        }
        Ok(self.events.rewind())
    }

    /// Move to the next record. After the last record no record is current
    /// and `Ok(false)` is returned.
    pub fn next_record(&mut self) -> Result<bool> {
        if !self.ensure_event()? {
            return Ok(false);
        }
        Ok(self.events.advance())
    }

    /// Move to the first record of type `record_type`.
    pub fn find_record_type(&mut self, record_type: u32) -> bool {
        self.events.find_type(record_type)
    }

    /// Move to the first record with a type in `low..=high`.
    pub fn find_record_type_range(&mut self, low: u32, high: u32) -> bool {
        self.events.find_type_range(low, high)
    }

    // ── Field traversal ─────────────────────────────────────────────────

    /// Move to the first field of the current record.
    pub fn first_field(&mut self) -> bool {
        self.events
            .current_mut()
            .is_some_and(|r| r.fields_mut().rewind())
    }

    /// Move to the next field of the current record. Returns `false` at the
    /// last field, leaving the cursor there.
    pub fn next_field(&mut self) -> bool {
        self.events
            .current_mut()
            .is_some_and(|r| r.fields_mut().advance())
    }

    /// Find the next field called `name`, starting at the current field.
    ///
    /// The name is remembered for [`AuParser::find_field_next`]. The scan
    /// covers the rest of the current record and then every later record of
    /// the event. On success the cursors rest on the match.
    pub fn find_field(&mut self, name: &str) -> Option<&str> {
        self.find_name = Some(name.to_string());
        let start = self.events.current()?.fields().position().unwrap_or(0);
        self.scan_for_field(start)
    }

    /// Find the next field with the remembered name, strictly after the
    /// current field.
    ///
    /// # Errors
    /// [`crate::util::error::AuparseError::InvalidArgument`] if
    /// [`AuParser::find_field`] was never called.
    pub fn find_field_next(&mut self) -> Result<Option<&str>> {
        if self.find_name.is_none() {
            return Err(invalid_arg("find_field_next called before find_field"));
        }
        let Some(record) = self.events.current() else {
            return Ok(None);
        };
        let start = record.fields().position().map_or(0, |idx| idx + 1);
        Ok(self.scan_for_field(start))
    }

    fn scan_for_field(&mut self, mut start: usize) -> Option<&str> {
        let name = self.find_name.clone()?;
        loop {
            let hit = self.events.current()?.fields().find_from(start, &name);
            if let Some(idx) = hit {
                let record = self.events.current_mut()?;
                record.fields_mut().seek(idx);
                return self.field_str();
            }
            if !self.events.advance() {
                return None;
            }
            start = 0;
        }
    }

    // ── Event accessors ─────────────────────────────────────────────────

    /// Identity of the current event, valid or not.
    pub fn timestamp(&self) -> Option<EventId> {
        self.events.id()
    }

    /// Seconds part of the current event's stamp, 0 when none is loaded.
    pub fn time(&self) -> u64 {
        self.events.id().map_or(0, |id| id.sec)
    }

    /// Milliseconds part of the current event's stamp, 0 when none is loaded.
    pub fn milli(&self) -> u32 {
        self.events.id().map_or(0, |id| id.milli)
    }

    /// Serial number of the current event, 0 when none is loaded.
    pub fn serial(&self) -> u64 {
        self.events.id().map_or(0, |id| id.serial)
    }

    /// Wall-clock time of the current event, if its stamp is valid.
    pub fn event_time(&self) -> Option<DateTime<Utc>> {
        let id = self.events.id().filter(EventId::is_valid)?;
        audit_datetime(id.sec, id.milli)
    }

    /// Originating host, from a leading `node=` field of the first record.
    pub fn node(&self) -> Option<&str> {
        let first = self.events.records().first()?.fields().get(0)?;
        (first.name() == "node").then_some(first.value())
    }

    pub fn num_records(&self) -> usize {
        self.events.len()
    }

    // ── Record accessors ────────────────────────────────────────────────

    fn record(&self) -> Option<&Record> {
        self.events.current()
    }

    pub fn record_type(&self) -> Option<u32> {
        self.record()?.record_type()
    }

    /// Name of the current record's type, `UNKNOWN[n]` for unnamed codes.
    pub fn record_type_name(&self) -> Option<String> {
        self.record_type().map(msg_type_display)
    }

    /// Raw text of the current record.
    pub fn record_text(&self) -> Option<&str> {
        self.record().map(Record::text)
    }

    /// Number of fields in the current record, 0 when none is current.
    pub fn num_fields(&self) -> usize {
        self.record().map_or(0, |r| r.fields().len())
    }

    // ── Field accessors ─────────────────────────────────────────────────

    fn field(&self) -> Option<&Field> {
        self.record()?.fields().current()
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field().map(Field::name)
    }

    /// Raw value of the current field.
    pub fn field_str(&self) -> Option<&str> {
        self.field().map(Field::value)
    }

    /// Current field value as a decimal integer.
    pub fn field_int(&self) -> Option<i64> {
        self.field_str()?.parse().ok()
    }

    /// Human-readable rendering of the current field, computed once and
    /// then served from the field.
    pub fn interpret_field(&self) -> Option<&str> {
        let record = self.record()?;
        let idx = record.fields().position()?;
        interpret_field(record, idx, &self.identity)
    }

    // ── Snapshots ───────────────────────────────────────────────────────

    /// Owned copy of the current event with raw and interpreted values.
    pub fn snapshot(&self) -> Option<EventSnapshot> {
        let id = self.events.id()?;
        let records = self
            .events
            .records()
            .iter()
            .map(|record| RecordSnapshot {
                record_type: record.record_type(),
                type_name: record
                    .record_type()
                    .map_or_else(|| "UNKNOWN".to_string(), msg_type_display),
                text: record.text().to_string(),
                fields: record
                    .fields()
                    .iter()
                    .enumerate()
                    .map(|(idx, field)| FieldSnapshot {
                        name: field.name().to_string(),
                        value: field.value().to_string(),
                        interpreted: interpret_field(record, idx, &self.identity)
                            .unwrap_or(field.value())
                            .to_string(),
                    })
                    .collect(),
            })
            .collect();

        Some(EventSnapshot {
            id,
            time: format_event_time(id.sec, id.milli),
            node: self.node().map(str::to_string),
            records,
        })
    }
}
