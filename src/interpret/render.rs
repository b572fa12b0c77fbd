//! Renderers for each [`super::FieldKind`].

use super::identity::IdentityCache;
use super::RecordContext;
use crate::lookup::syscalls::syscall_name;
use crate::lookup::tables::{
    lookup, set_bits, CAPABILITIES, CLONE_FLAGS, FCNTL_COMMANDS, IPC_OPS, OPEN_FLAGS,
    PATH_LOOKUP_FLAGS, PERM_BITS, SOCKETCALL_OPS,
};
use crate::lookup::Machine;
use crate::util::constants::{F_SETOWN, O_ACCMODE};
use nix::errno::Errno;
use nix::sys::signal::Signal;

fn conversion_error(value: &str) -> String {
    format!("conversion error({value})")
}

/// A uid/gid field: `None` for the unset marker (-1).
fn parse_id(value: &str) -> Option<Option<u32>> {
    let n: i64 = value.parse().ok()?;
    if n == -1 || n == i64::from(u32::MAX) {
        return Some(None);
    }
    u32::try_from(n).ok().map(Some)
}

pub fn uid(value: &str, ids: &IdentityCache) -> String {
    match parse_id(value) {
        Some(None) => "unset".to_string(),
        Some(Some(uid)) => ids
            .user_name(uid)
            .unwrap_or_else(|| format!("unknown({uid})")),
        None => conversion_error(value),
    }
}

pub fn gid(value: &str, ids: &IdentityCache) -> String {
    match parse_id(value) {
        Some(None) => "unset".to_string(),
        Some(Some(gid)) => ids
            .group_name(gid)
            .unwrap_or_else(|| format!("unknown({gid})")),
        None => conversion_error(value),
    }
}

/// Machine for syscall lookups: the record's, else the host's.
fn effective_machine(ctx: &RecordContext) -> Option<Machine> {
    ctx.machine.or_else(Machine::host)
}

/// Name of the record's syscall, used by the argument renderers.
fn record_syscall_name(ctx: &RecordContext) -> Option<&'static str> {
    syscall_name(effective_machine(ctx)?, ctx.syscall?)
}

pub fn syscall(value: &str, ctx: &RecordContext) -> String {
    let Some(machine) = effective_machine(ctx) else {
        return value.to_string();
    };
    let Some(num) = value.parse::<i32>().ok().or(ctx.syscall) else {
        return conversion_error(value);
    };
    match syscall_name(machine, num) {
        Some(name @ "socketcall") => multiplexed(name, SOCKETCALL_OPS, ctx.a0),
        Some(name @ "ipc") => multiplexed(name, IPC_OPS, ctx.a0),
        Some(name) => name.to_string(),
        None => format!("unknown syscall({num})"),
    }
}

/// `socketcall` and `ipc` carry the real operation in `a0`.
fn multiplexed(name: &str, ops: &'static [(u64, &'static str)], a0: Option<u64>) -> String {
    match a0.and_then(|op| lookup(ops, op)) {
        Some(op) => format!("{name}({op})"),
        None => name.to_string(),
    }
}

pub fn arch(value: &str, ctx: &RecordContext) -> String {
    let machine = u32::from_str_radix(value, 16)
        .ok()
        .and_then(Machine::from_elf)
        .or(ctx.machine);
    match machine {
        Some(m) => m.name().to_string(),
        None => format!("unknown elf type({value})"),
    }
}

pub fn exit(value: &str) -> String {
    let Ok(code) = value.parse::<i64>() else {
        return conversion_error(value);
    };
    if code >= 0 {
        return value.to_string();
    }
    match code.checked_neg().and_then(|n| i32::try_from(n).ok()) {
        Some(errno) => format!("{code}({})", Errno::from_raw(errno).desc()),
        None => value.to_string(),
    }
}

/// Quoted, parenthesised or hex-encoded strings.
pub fn escaped(value: &str) -> String {
    if let Some(rest) = value.strip_prefix('"') {
        return match rest.find('"') {
            Some(end) => rest[..end].to_string(),
            None => " ".to_string(),
        };
    }
    unescape(value).unwrap_or_else(|| value.to_string())
}

/// Decode a kernel-escaped string.
///
/// `(...)` markers such as `(null)` pass through up to the closing
/// parenthesis. Otherwise the value must be an all-hex string of at least
/// two digits, decoded two digits per byte.
pub fn unescape(value: &str) -> Option<String> {
    if value.starts_with('(') {
        let end = value.find(')')?;
        return Some(value[..=end].to_string());
    }
    if value.len() < 2 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes: Vec<u8> = value
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0]);
            let lo = pair.get(1).map_or(0, |&c| hex_digit(c));
            (hi << 4) | lo
        })
        .collect();
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

pub fn perm(value: &str) -> String {
    let Ok(mut bits) = value.parse::<u64>() else {
        return conversion_error(value);
    };
    // 0 means every permission
    if bits == 0 {
        bits = 0xF;
    }
    let names = set_bits(PERM_BITS, bits);
    if names.is_empty() {
        return value.to_string();
    }
    names.join(",")
}

const S_IFMT: u32 = 0o170000;
const FILE_TYPES: &[(u32, &str)] = &[
    (0o140000, "socket"),
    (0o120000, "symlink"),
    (0o100000, "file"),
    (0o060000, "block"),
    (0o040000, "dir"),
    (0o020000, "char"),
    (0o010000, "fifo"),
];
const SPECIAL_BITS: &[(u32, &str)] = &[(0o4000, "suid"), (0o2000, "sgid"), (0o1000, "sticky")];

pub fn mode(value: &str) -> String {
    let Ok(mode) = u32::from_str_radix(value, 8) else {
        return conversion_error(value);
    };
    let mut out = String::new();
    if let Some(kind) = lookup(FILE_TYPES, mode & S_IFMT) {
        out.push_str(kind);
        out.push(',');
    }
    for (bit, name) in SPECIAL_BITS {
        if mode & bit != 0 {
            out.push_str(name);
            out.push(',');
        }
    }
    out.push_str(&format!("{:03o}", mode & 0o777));
    out
}

pub fn flags(value: &str) -> String {
    let Ok(bits) = u64::from_str_radix(value, 16) else {
        return conversion_error(value);
    };
    if bits == 0 {
        return "none".to_string();
    }
    let names = set_bits(PATH_LOOKUP_FLAGS, bits);
    if names.is_empty() {
        return value.to_string();
    }
    names.join(",")
}

pub fn promiscuous(value: &str) -> String {
    match value.parse::<i64>() {
        Ok(0) => "no".to_string(),
        Ok(_) => "yes".to_string(),
        Err(_) => conversion_error(value),
    }
}

pub fn capability(value: &str) -> String {
    let Ok(cap) = value.parse::<u64>() else {
        return conversion_error(value);
    };
    match lookup(CAPABILITIES, cap) {
        Some(name) => name.to_string(),
        None => format!("unknown capability({value})"),
    }
}

pub fn success(value: &str) -> String {
    if !value.starts_with(|c: char| c.is_ascii_digit()) {
        return value.to_string();
    }
    match value.parse::<i64>() {
        Ok(0) => "no".to_string(),
        Ok(1) => "yes".to_string(),
        Ok(_) => "unset".to_string(),
        Err(_) => conversion_error(value),
    }
}

pub fn a1(value: &str, ctx: &RecordContext) -> String {
    let Some(name) = record_syscall_name(ctx) else {
        return value.to_string();
    };
    if name == "open" {
        let Ok(bits) = u64::from_str_radix(value, 16) else {
            return conversion_error(value);
        };
        return open_flags(bits);
    }
    if name.starts_with("fcntl") {
        let Ok(cmd) = u64::from_str_radix(value, 16) else {
            return conversion_error(value);
        };
        return match lookup(FCNTL_COMMANDS, cmd) {
            Some(cmd) => cmd.to_string(),
            None => format!("unknown fcntl command({cmd})"),
        };
    }
    value.to_string()
}

fn open_flags(bits: u64) -> String {
    let mut names = Vec::new();
    if bits & O_ACCMODE == 0 {
        names.push("O_RDONLY");
    }
    names.extend(set_bits(OPEN_FLAGS, bits));
    names.join("|")
}

pub fn a2(value: &str, ctx: &RecordContext, ids: &IdentityCache) -> String {
    let Some(name) = record_syscall_name(ctx) else {
        return value.to_string();
    };
    if name == "clone" {
        let Ok(bits) = u64::from_str_radix(value, 16) else {
            return conversion_error(value);
        };
        let names = set_bits(CLONE_FLAGS, bits);
        if names.is_empty() {
            return bits.to_string();
        }
        return names.join("|");
    }
    if name.starts_with("fcntl") && ctx.a1 == Some(F_SETOWN) {
        let Ok(owner) = u64::from_str_radix(value, 16) else {
            return conversion_error(value);
        };
        return uid(&owner.to_string(), ids);
    }
    value.to_string()
}

pub fn signal(value: &str) -> String {
    let Ok(num) = value.parse::<i32>() else {
        return conversion_error(value);
    };
    match Signal::try_from(num) {
        Ok(sig) => sig.as_str().to_string(),
        Err(_) => format!("unknown signal({num})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::identity::IdentityResolver;

    struct FixedIds;

    impl IdentityResolver for FixedIds {
        fn user_name(&self, uid: u32) -> Option<String> {
            (uid == 0).then(|| "root".to_string())
        }

        fn group_name(&self, gid: u32) -> Option<String> {
            (gid == 10).then(|| "wheel".to_string())
        }
    }

    fn ids() -> IdentityCache {
        IdentityCache::new(Box::new(FixedIds))
    }

    fn x86_64(syscall: i32) -> RecordContext {
        RecordContext {
            machine: Some(Machine::X86_64),
            syscall: Some(syscall),
            ..RecordContext::default()
        }
    }

    #[test]
    fn test_uid_and_gid() {
        let ids = ids();
        assert_eq!(uid("0", &ids), "root");
        assert_eq!(uid("4294967295", &ids), "unset");
        assert_eq!(uid("-1", &ids), "unset");
        assert_eq!(uid("4242", &ids), "unknown(4242)");
        assert_eq!(uid("abc", &ids), "conversion error(abc)");
        assert_eq!(gid("10", &ids), "wheel");
    }

    #[test]
    fn test_syscall_names() {
        assert_eq!(syscall("2", &x86_64(2)), "open");
        assert_eq!(syscall("999", &x86_64(999)), "unknown syscall(999)");
        let ctx = RecordContext {
            machine: Some(Machine::X86),
            syscall: Some(102),
            a0: Some(3),
            ..RecordContext::default()
        };
        assert_eq!(syscall("102", &ctx), "socketcall(connect)");
    }

    #[test]
    fn test_arch() {
        assert_eq!(arch("c000003e", &RecordContext::default()), "x86_64");
        assert_eq!(
            arch("12345", &RecordContext::default()),
            "unknown elf type(12345)"
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit("0"), "0");
        assert_eq!(exit("-2"), "-2(No such file or directory)");
        assert_eq!(exit("x"), "conversion error(x)");
        assert_eq!(exit("-9223372036854775808"), "-9223372036854775808");
        assert_eq!(exit("-4294967296"), "-4294967296");
    }

    #[test]
    fn test_escaped_forms() {
        assert_eq!(escaped("\"/bin/login\""), "/bin/login");
        assert_eq!(escaped("\"unterminated"), " ");
        assert_eq!(escaped("2F746D70"), "/tmp");
        assert_eq!(escaped("(null)"), "(null)");
        assert_eq!(escaped("(broken"), "(broken");
        assert_eq!(escaped("?"), "?");
        assert_eq!(unescape("a"), None);
    }

    #[test]
    fn test_perm_and_mode() {
        assert_eq!(perm("0"), "read,write,exec,attr");
        assert_eq!(perm("6"), "read,write");
        assert_eq!(mode("0100644"), "file,644");
        assert_eq!(mode("041777"), "dir,sticky,777");
        assert_eq!(mode("104755"), "file,suid,755");
        assert_eq!(mode("9"), "conversion error(9)");
    }

    #[test]
    fn test_flags_and_flags_zero() {
        assert_eq!(flags("0"), "none");
        assert_eq!(flags("101"), "follow,open");
    }

    #[test]
    fn test_small_enumerations() {
        assert_eq!(promiscuous("0"), "no");
        assert_eq!(promiscuous("256"), "yes");
        assert_eq!(capability("21"), "sys_admin");
        assert_eq!(capability("99"), "unknown capability(99)");
        assert_eq!(success("1"), "yes");
        assert_eq!(success("0"), "no");
        assert_eq!(success("7"), "unset");
        assert_eq!(success("yes"), "yes");
        assert_eq!(signal("9"), "SIGKILL");
        assert_eq!(signal("200"), "unknown signal(200)");
    }

    #[test]
    fn test_open_flags() {
        assert_eq!(a1("0", &x86_64(2)), "O_RDONLY");
        assert_eq!(a1("241", &x86_64(2)), "O_WRONLY|O_CREAT|O_TRUNC");
        assert_eq!(a1("8000", &x86_64(2)), "O_RDONLY|O_LARGEFILE");
    }

    #[test]
    fn test_fcntl_and_clone_arguments() {
        assert_eq!(a1("4", &x86_64(72)), "F_SETFL");
        assert_eq!(a1("7d0", &x86_64(72)), "unknown fcntl command(2000)");
        assert_eq!(a2("11", &x86_64(56), &ids()), "17");
        assert_eq!(a2("100", &x86_64(56), &ids()), "CLONE_VM");
        let ctx = RecordContext {
            a1: Some(F_SETOWN),
            ..x86_64(72)
        };
        assert_eq!(a2("0", &ctx, &ids()), "root");
    }

    #[test]
    fn test_arguments_of_other_syscalls_pass_through() {
        assert_eq!(a1("3958d11333", &x86_64(188)), "3958d11333");
        assert_eq!(a2("5131f0", &x86_64(188), &ids()), "5131f0");
    }
}
