//! auparse library crate.
//!
//! Groups raw Linux audit log lines into events, exposes event, record and
//! field cursors over them, renders field values for humans, and searches
//! events with simple field rules. The command-line front end is in
//! `main.rs`.

pub mod core;
pub mod export;
pub mod interpret;
pub mod lookup;
pub mod util;

pub use crate::core::parser::AuParser;
pub use crate::core::rule::{RuleMode, SearchOp, StopPoint};
pub use crate::core::source::Source;
pub use crate::util::error::{AuparseError, Result};
