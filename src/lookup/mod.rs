//! Static lookup tables.
//!
//! Immutable data shared by the record parser and the interpreter: message
//! type names, machines, syscall numbers, and the flag and name tables.

pub mod machines;
pub mod msg_types;
pub mod syscalls;
pub mod tables;

pub use machines::Machine;
