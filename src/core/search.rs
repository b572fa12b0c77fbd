//! Rule-based search over the parser's cursors.
//!
//! Rules are evaluated record by record. A record matches in AND mode when
//! every rule finds a satisfying field, and in OR (or single-rule) mode when
//! any rule does. After a match the cursors are repositioned according to
//! the configured [`StopPoint`].

use super::parser::AuParser;
use super::record::Record;
use super::rule::{Rule, RuleList, RuleMode, SearchOp, StopPoint};
use crate::util::error::{invalid_arg, AuparseError, Result};

impl AuParser {
    /// Add a search rule.
    ///
    /// `op` is one of `exists`, `=`, `!=`. `value` is required for the
    /// comparisons and ignored for `exists`. `how` is [`RuleMode::Clear`] to
    /// start a new list, otherwise the list's AND/OR mode.
    ///
    /// A comparison is satisfied by any field of the record with the rule's
    /// name, not only the first one. A LOGIN record carrying
    /// `old auid=4294967295 new auid=0` matches `auid=0`.
    ///
    /// # Errors
    /// [`AuparseError::InvalidArgument`] for a bad operator, empty field or
    /// missing value; [`AuparseError::RuleConflict`] when mixing AND and OR.
    /// The rule list is unchanged on error.
    pub fn search_add_item(
        &mut self,
        field: &str,
        op: &str,
        value: Option<&str>,
        how: RuleMode,
    ) -> Result<()> {
        let op: SearchOp = op.parse()?;
        let rule = Rule::new(field, op, value)?;
        self.rules.add(rule, how)
    }

    /// Regular-expression search is not available.
    ///
    /// # Errors
    /// [`AuparseError::InvalidArgument`] for an empty expression, otherwise
    /// always [`AuparseError::NotSupported`].
    pub fn search_add_regex(&mut self, expr: &str) -> Result<()> {
        if expr.is_empty() {
            return Err(invalid_arg("empty search expression"));
        }
        Err(AuparseError::NotSupported(format!(
            "regular expression search ('{expr}')"
        )))
    }

    /// Set where the cursors rest after a match.
    pub fn search_set_stop(&mut self, stop: StopPoint) {
        self.stop = stop;
    }

    /// Remove all rules and restore the default stop point.
    pub fn search_clear(&mut self) {
        self.rules.clear();
        self.stop = StopPoint::default();
    }

    pub fn search_rules(&self) -> &[Rule] {
        self.rules.rules()
    }

    pub fn search_mode(&self) -> RuleMode {
        self.rules.mode()
    }

    pub fn search_stop(&self) -> StopPoint {
        self.stop
    }

    /// Scan forward for the next record satisfying the rules.
    ///
    /// The scan starts at the first record of the current event (loading
    /// one if needed), so a repeated call without moving on reports the
    /// same event again. Call [`AuParser::next_event`] to continue past a
    /// match.
    ///
    /// # Errors
    /// [`AuparseError::InvalidArgument`] when no rules have been added; I/O
    /// failures while loading events.
    pub fn search_next_event(&mut self) -> Result<bool> {
        if self.rules.is_empty() {
            return Err(invalid_arg("no search rules have been added"));
        }
        if !self.first_record()? {
            return Ok(false);
        }

        loop {
            loop {
                let hit = self
                    .events
                    .current()
                    .and_then(|record| match_record(&self.rules, record));
                if let Some(idx) = hit {
                    self.stop_on_match(idx);
                    return Ok(true);
                }
                if !self.events.advance() {
                    break;
                }
            }
            if !self.next_event()? {
                return Ok(false);
            }
        }
    }

    fn stop_on_match(&mut self, field_idx: usize) {
        if let Some(id) = self.events.id() {
            tracing::trace!("Search matched event {id}");
        }
        match self.stop {
            StopPoint::Event => {
                self.events.rewind();
            }
            StopPoint::Record => {
                if let Some(record) = self.events.current_mut() {
                    record.fields_mut().rewind();
                }
            }
            StopPoint::Field => {
                if let Some(record) = self.events.current_mut() {
                    record.fields_mut().seek(field_idx);
                }
            }
        }
    }
}

/// Index of the field that satisfies `rules` in `record`: the first
/// satisfying field in OR mode, the last rule's field in AND mode.
fn match_record(rules: &RuleList, record: &Record) -> Option<usize> {
    let satisfying_field = |rule: &Rule| {
        record
            .fields()
            .iter()
            .position(|f| f.name() == rule.field && rule.matches_value(f.value()))
    };

    match rules.mode() {
        RuleMode::And => {
            let mut last = None;
            for rule in rules.rules() {
                last = Some(satisfying_field(rule)?);
            }
            last
        }
        RuleMode::Or | RuleMode::Clear => rules.rules().iter().find_map(satisfying_field),
    }
}
