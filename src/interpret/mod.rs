//! Field interpretation: raw audit values to human-readable text.
//!
//! A field's name selects a [`FieldKind`] through a compile-time map; the
//! kind selects a renderer in [`render`]. Renderers never fail. Values they
//! cannot parse render as `conversion error(value)` and unrecognised codes
//! as `unknown <kind>(value)`.

pub mod identity;
pub mod render;
pub mod sockaddr;

use crate::core::record::Record;
use crate::lookup::Machine;
use crate::util::constants::AUDIT_EXECVE;
use phf::phf_map;

pub use identity::{IdentityCache, IdentityResolver, SystemResolver};

/// How a field's value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uid,
    Gid,
    Syscall,
    Arch,
    Exit,
    Escaped,
    Perm,
    Mode,
    Sockaddr,
    Flags,
    Promisc,
    Capability,
    Success,
    A0,
    A1,
    A2,
    Signal,
}

static FIELD_KINDS: phf::Map<&'static str, FieldKind> = phf_map! {
    "auid" => FieldKind::Uid,
    "uid" => FieldKind::Uid,
    "euid" => FieldKind::Uid,
    "suid" => FieldKind::Uid,
    "fsuid" => FieldKind::Uid,
    "ouid" => FieldKind::Uid,
    "oauid" => FieldKind::Uid,
    "iuid" => FieldKind::Uid,
    "id" => FieldKind::Uid,
    "inode_uid" => FieldKind::Uid,
    "sauid" => FieldKind::Uid,
    "obj_uid" => FieldKind::Uid,
    "gid" => FieldKind::Gid,
    "egid" => FieldKind::Gid,
    "sgid" => FieldKind::Gid,
    "fsgid" => FieldKind::Gid,
    "ogid" => FieldKind::Gid,
    "igid" => FieldKind::Gid,
    "inode_gid" => FieldKind::Gid,
    "new_gid" => FieldKind::Gid,
    "obj_gid" => FieldKind::Gid,
    "syscall" => FieldKind::Syscall,
    "arch" => FieldKind::Arch,
    "exit" => FieldKind::Exit,
    "path" => FieldKind::Escaped,
    "comm" => FieldKind::Escaped,
    "exe" => FieldKind::Escaped,
    "file" => FieldKind::Escaped,
    "name" => FieldKind::Escaped,
    "watch" => FieldKind::Escaped,
    "cwd" => FieldKind::Escaped,
    "cmd" => FieldKind::Escaped,
    "dir" => FieldKind::Escaped,
    "key" => FieldKind::Escaped,
    "acct" => FieldKind::Escaped,
    "perm" => FieldKind::Perm,
    "perm_mask" => FieldKind::Perm,
    "mode" => FieldKind::Mode,
    "saddr" => FieldKind::Sockaddr,
    "flags" => FieldKind::Flags,
    "prom" => FieldKind::Promisc,
    "old_prom" => FieldKind::Promisc,
    "capability" => FieldKind::Capability,
    "res" => FieldKind::Success,
    "result" => FieldKind::Success,
    "success" => FieldKind::Success,
    "a0" => FieldKind::A0,
    "a1" => FieldKind::A1,
    "a2" => FieldKind::A2,
    "sig" => FieldKind::Signal,
};

/// The record attributes a renderer may consult.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordContext {
    pub record_type: Option<u32>,
    pub machine: Option<Machine>,
    pub syscall: Option<i32>,
    pub a0: Option<u64>,
    pub a1: Option<u64>,
}

impl RecordContext {
    pub fn of(record: &Record) -> Self {
        Self {
            record_type: record.record_type(),
            machine: record.machine(),
            syscall: record.syscall(),
            a0: record.a0(),
            a1: record.a1(),
        }
    }
}

/// Select the renderer for a field. `None` means the value is shown as-is.
pub fn field_kind(ctx: &RecordContext, name: &str) -> Option<FieldKind> {
    // EXECVE arguments are a0, a1, ... and hold escaped strings, not
    // syscall arguments.
    if ctx.record_type == Some(AUDIT_EXECVE) && name.starts_with('a') {
        return Some(FieldKind::Escaped);
    }
    FIELD_KINDS.get(name).copied()
}

/// Render `value` of field `name` for display.
pub fn interpret(ctx: &RecordContext, name: &str, value: &str, ids: &IdentityCache) -> String {
    let Some(kind) = field_kind(ctx, name) else {
        return value.to_string();
    };
    match kind {
        FieldKind::Uid => render::uid(value, ids),
        FieldKind::Gid => render::gid(value, ids),
        FieldKind::Syscall => render::syscall(value, ctx),
        FieldKind::Arch => render::arch(value, ctx),
        FieldKind::Exit => render::exit(value),
        FieldKind::Escaped => render::escaped(value),
        FieldKind::Perm => render::perm(value),
        FieldKind::Mode => render::mode(value),
        FieldKind::Sockaddr => sockaddr::render(value),
        FieldKind::Flags => render::flags(value),
        FieldKind::Promisc => render::promiscuous(value),
        FieldKind::Capability => render::capability(value),
        FieldKind::Success => render::success(value),
        FieldKind::A0 => value.to_string(),
        FieldKind::A1 => render::a1(value, ctx),
        FieldKind::A2 => render::a2(value, ctx, ids),
        FieldKind::Signal => render::signal(value),
    }
}

/// Interpret field `idx` of `record`, memoizing the result on the field.
pub fn interpret_field<'r>(record: &'r Record, idx: usize, ids: &IdentityCache) -> Option<&'r str> {
    let field = record.fields().get(idx)?;
    let ctx = RecordContext::of(record);
    Some(field.interpreted_with(|| interpret(&ctx, field.name(), field.value(), ids)))
}
