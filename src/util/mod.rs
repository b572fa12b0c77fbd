//! Shared utilities: errors, constants, time helpers and configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod time;
