//! Name/value fields of a record and the cursor over them.

use std::cell::OnceCell;

/// One `name=value` pair extracted from a record.
///
/// The raw value is never modified. The interpreted value is computed on
/// first request and kept for the lifetime of the field.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    value: String,
    interpreted: OnceCell<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            interpreted: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw value as it appeared in the record, after token trimming.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Return the memoized interpretation, computing it with `render` the
    /// first time.
    pub fn interpreted_with(&self, render: impl FnOnce() -> String) -> &str {
        self.interpreted.get_or_init(render)
    }

    /// Whether the interpretation has already been computed.
    pub fn is_interpreted(&self) -> bool {
        self.interpreted.get().is_some()
    }
}

/// Ordered fields of one record plus a cursor.
///
/// The cursor is unset only while the list is empty. Moving past the last
/// field reports `false` and leaves the cursor on the last field.
#[derive(Debug, Clone, Default)]
pub struct FieldList {
    fields: Vec<Field>,
    cursor: Option<usize>,
}

impl FieldList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field and move the cursor onto it.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
        self.cursor = Some(self.fields.len() - 1);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn get(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    /// Index of the current field.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Field> {
        self.cursor.and_then(|idx| self.fields.get(idx))
    }

    /// Rewind the cursor to the first field. Returns `false` if empty.
    pub fn rewind(&mut self) -> bool {
        if self.fields.is_empty() {
            self.cursor = None;
            return false;
        }
        self.cursor = Some(0);
        true
    }

    /// Advance the cursor. Returns `false` at the last field.
    pub fn advance(&mut self) -> bool {
        match self.cursor {
            Some(idx) if idx + 1 < self.fields.len() => {
                self.cursor = Some(idx + 1);
                true
            }
            _ => false,
        }
    }

    /// Place the cursor on `idx` if it exists.
    pub fn seek(&mut self, idx: usize) -> bool {
        if idx < self.fields.len() {
            self.cursor = Some(idx);
            true
        } else {
            false
        }
    }

    /// Index of the first field at or after `from` named `name`.
    pub fn find_from(&self, from: usize, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, f)| f.name == name)
            .map(|(idx, _)| idx)
    }
}
