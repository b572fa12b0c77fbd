//! A single audit record: the raw line plus its parsed fields.
//!
//! Tokenisation follows the audit log conventions:
//!
//! - tokens are separated by spaces and split at their first `=`;
//! - the `msg=audit(...)` stamp token is skipped;
//! - a nested user-space message (`msg='...'`) is flattened into the
//!   record's own fields;
//! - SELinux AVC records get synthetic `seresults` and `seperms` fields for
//!   their bare-word decision and `{ perm ... }` block.
//!
//! Malformed tokens are dropped rather than reported.

use super::field::{Field, FieldList};
use crate::lookup::msg_types::msg_type_from_name;
use crate::lookup::Machine;
use crate::util::constants::{AUDIT_AVC, AUDIT_USER_AVC};

/// One raw audit line and the fields parsed from it.
///
/// The typed attributes are filled from fields at fixed positions:
/// 1st `type`, 2nd `arch`, 3rd `syscall`, 6th `a0`, 7th `a1`. `None`
/// means the field was absent at that position or failed to convert.
#[derive(Debug, Clone)]
pub struct Record {
    text: String,
    record_type: Option<u32>,
    machine: Option<Machine>,
    syscall: Option<i32>,
    a0: Option<u64>,
    a1: Option<u64>,
    fields: FieldList,
}

impl Record {
    /// Parse a raw line into a record. Never fails.
    pub fn parse(text: impl Into<String>) -> Self {
        let mut record = Self {
            text: text.into(),
            record_type: None,
            machine: None,
            syscall: None,
            a0: None,
            a1: None,
            fields: FieldList::new(),
        };
        let fields = parse_fields(&record.text);
        for field in fields {
            record.push_field(field);
        }
        record
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn record_type(&self) -> Option<u32> {
        self.record_type
    }

    pub fn machine(&self) -> Option<Machine> {
        self.machine
    }

    pub fn syscall(&self) -> Option<i32> {
        self.syscall
    }

    pub fn a0(&self) -> Option<u64> {
        self.a0
    }

    pub fn a1(&self) -> Option<u64> {
        self.a1
    }

    pub fn fields(&self) -> &FieldList {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldList {
        &mut self.fields
    }

    /// Append a field, updating the positional attributes.
    fn push_field(&mut self, field: Field) {
        let position = self.fields.len() + 1 - node_offset(self.fields.iter());
        match (position, field.name()) {
            (1, "type") => self.record_type = msg_type_from_name(field.value()),
            (2, "arch") => {
                self.machine = u32::from_str_radix(field.value(), 16)
                    .ok()
                    .and_then(Machine::from_elf)
            }
            (3, "syscall") => self.syscall = field.value().parse().ok(),
            (6, "a0") => self.a0 = u64::from_str_radix(field.value(), 16).ok(),
            (7, "a1") => self.a1 = u64::from_str_radix(field.value(), 16).ok(),
            _ => {}
        }
        self.fields.push(field);
    }
}

/// Split a record line into fields.
fn parse_fields(text: &str) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::new();
    let mut is_avc = false;
    let mut tokens = text.split(' ').filter(|t| !t.is_empty());

    while let Some(token) = tokens.next() {
        let counted = fields.len() - node_offset(fields.iter());
        if token.contains('=') {
            let Some((name, value)) = split_token(token) else {
                continue;
            };
            if counted == 0 && name == "type" {
                is_avc = matches!(
                    msg_type_from_name(value),
                    Some(AUDIT_AVC) | Some(AUDIT_USER_AVC)
                );
            }
            fields.push(Field::new(name, value));
        } else if is_avc {
            match counted {
                1 if token.starts_with("avc") => {}
                1 => fields.push(Field::new("seresults", token)),
                2 if token.starts_with('{') => {
                    let perms: Vec<&str> = tokens.by_ref().take_while(|t| *t != "}").collect();
                    fields.push(Field::new("seperms", perms.join(",")));
                }
                _ => tracing::trace!("Dropping bare AVC token '{token}'"),
            }
        } else {
            tracing::trace!("Dropping token without '=': '{token}'");
        }
    }
    fields
}

/// 1 when the record starts with a `node=` field, which shifts every
/// positional field by one.
fn node_offset<'a>(mut fields: impl Iterator<Item = &'a Field>) -> usize {
    usize::from(fields.next().is_some_and(|f| f.name() == "node"))
}

/// Split a `name=value` token, applying the audit trimming conventions.
///
/// Returns `None` for tokens that carry no field (the `msg=audit(...)`
/// stamp, or a nested message prefix with nothing after it).
fn split_token(token: &str) -> Option<(&str, &str)> {
    let mut token = token;
    if let Some(rest) = token.strip_prefix("msg=") {
        if rest.starts_with('a') {
            return None;
        }
        if let Some(inner) = rest.strip_prefix('\'') {
            token = inner;
        }
    }

    let (name, value) = token.split_once('=')?;
    let name = name.strip_prefix('(').unwrap_or(name);
    Some((name, trim_value(value)))
}

/// Strip the punctuation the kernel and user-space writers leave on values.
fn trim_value(value: &str) -> &str {
    let value = value.strip_suffix(':').unwrap_or(value);
    let value = value.strip_suffix(',').unwrap_or(value);
    let value = value.strip_suffix('\'').unwrap_or(value);
    if value == "(none)" || value == "(null)" {
        return value;
    }
    value.strip_suffix(')').unwrap_or(value)
}
