//! The records of the event currently being traversed.

use super::event::EventId;
use super::record::Record;

/// Ordered records of one event plus the record cursor.
///
/// Unlike the field cursor, the record cursor runs off the end: after
/// `advance` returns `false` no record is current until `rewind`.
#[derive(Debug, Default)]
pub struct EventList {
    records: Vec<Record>,
    cursor: Option<usize>,
    id: Option<EventId>,
}

impl EventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all records and forget the event identity.
    pub fn clear(&mut self) {
        self.records.clear();
        self.cursor = None;
        self.id = None;
    }

    pub fn set_id(&mut self, id: EventId) {
        self.id = Some(id);
    }

    pub fn id(&self) -> Option<EventId> {
        self.id
    }

    /// Parse `line` into a record, append it and make it current.
    pub fn append(&mut self, line: String) {
        self.records.push(Record::parse(line));
        self.cursor = Some(self.records.len() - 1);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Record> {
        self.cursor.and_then(|idx| self.records.get(idx))
    }

    pub fn current_mut(&mut self) -> Option<&mut Record> {
        self.cursor.and_then(|idx| self.records.get_mut(idx))
    }

    /// Move to the first record. Returns `false` when there are none.
    pub fn rewind(&mut self) -> bool {
        self.seek(0)
    }

    /// Move to the next record, or past the end.
    pub fn advance(&mut self) -> bool {
        match self.cursor {
            Some(idx) => self.seek(idx + 1),
            None => false,
        }
    }

    /// Make record `idx` current, rewinding its field cursor.
    pub fn seek(&mut self, idx: usize) -> bool {
        match self.records.get_mut(idx) {
            Some(record) => {
                record.fields_mut().rewind();
                self.cursor = Some(idx);
                true
            }
            None => {
                self.cursor = None;
                false
            }
        }
    }

    /// Move to the first record whose type is `record_type`.
    pub fn find_type(&mut self, record_type: u32) -> bool {
        self.find_where(|t| t == record_type)
    }

    /// Move to the first record whose type lies in `low..=high`.
    /// An empty or inverted range (`high <= low`) never matches.
    pub fn find_type_range(&mut self, low: u32, high: u32) -> bool {
        if high <= low {
            return false;
        }
        self.find_where(|t| (low..=high).contains(&t))
    }

    fn find_where(&mut self, pred: impl Fn(u32) -> bool) -> bool {
        let found = self
            .records
            .iter()
            .position(|r| r.record_type().is_some_and(&pred));
        match found {
            Some(idx) => self.seek(idx),
            None => false,
        }
    }
}
