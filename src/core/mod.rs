//! Core domain modules for auparse.
//!
//! Contains the record and event data model, line sources, the event
//! assembler with its cursors, and rule-based search.

pub mod event;
pub mod event_list;
pub mod field;
pub mod parser;
pub mod record;
pub mod rule;
pub mod search;
pub mod search_preset;
pub mod snapshot;
pub mod source;
