//! Event identity: the `audit(SEC.MILLI:SERIAL)` stamp shared by all records
//! of one event.

use std::cmp::Ordering;
use std::fmt;

/// Timestamp and serial number identifying one audit event.
///
/// `valid` is cleared when the stamp could not be fully parsed. An invalid
/// identity never groups with another line; its numbers hold whatever
/// parsed and are kept only for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct EventId {
    pub sec: u64,
    pub milli: u32,
    pub serial: u64,
    pub valid: bool,
}

impl EventId {
    pub fn new(sec: u64, milli: u32, serial: u64) -> Self {
        Self {
            sec,
            milli,
            serial,
            valid: true,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether a line carrying `other` continues the event identified by
    /// `self`. Invalid identities never match, not even themselves.
    pub fn same_event(&self, other: &EventId) -> bool {
        self.valid
            && other.valid
            && self.sec == other.sec
            && self.milli == other.milli
            && self.serial == other.serial
    }

    /// Chronological ordering by seconds, then milliseconds, then serial.
    pub fn cmp_timestamp(&self, other: &EventId) -> Ordering {
        self.sec
            .cmp(&other.sec)
            .then(self.milli.cmp(&other.milli))
            .then(self.serial.cmp(&other.serial))
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}:{}", self.sec, self.milli, self.serial)
    }
}

/// Extract the event identity from a raw record line.
///
/// Returns `None` when the line has no leading `type=` token (blank lines,
/// continuation text). Only the first two tokens are inspected, after an
/// optional `node=` prefix. A line with a `type=` token but a malformed
/// stamp yields an identity with `valid == false`.
pub fn extract_timestamp(line: &str) -> Option<EventId> {
    let mut tokens = line.split(' ').filter(|t| !t.is_empty());
    let mut first = tokens.next()?;
    if first.starts_with("node=") {
        first = tokens.next()?;
    }
    if !first.starts_with("type=") {
        return None;
    }

    let mut id = EventId::default();
    let Some(stamp) = tokens.next().and_then(stamp_text) else {
        return Some(id);
    };

    // SEC.MILLI[:SERIAL]
    let (time, serial) = match stamp.split_once(':') {
        Some((time, serial)) => (time, Some(serial)),
        None => (stamp, None),
    };
    let Some((sec, milli)) = time.split_once('.') else {
        id.sec = sec_prefix(time);
        return Some(id);
    };

    let sec = sec.parse::<u64>().ok();
    let milli = milli.parse::<u32>().ok();
    let serial = match serial {
        Some(text) => text.parse::<u64>().ok(),
        None => Some(0),
    };

    id.valid = sec.is_some() && milli.is_some() && serial.is_some();
    id.sec = sec.unwrap_or(0);
    id.milli = milli.unwrap_or(0);
    id.serial = serial.unwrap_or(0);
    Some(id)
}

/// Text between `(` and `)` of the `msg=audit(...)` token.
fn stamp_text(token: &str) -> Option<&str> {
    let open = token.find('(')?;
    let rest = &token[open + 1..];
    let close = rest.find(')').unwrap_or(rest.len());
    Some(&rest[..close])
}

/// Leading decimal digits of `text` as a number, 0 if none.
fn sec_prefix(text: &str) -> u64 {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..end].parse().unwrap_or(0)
}
