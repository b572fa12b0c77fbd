//! Crate-wide constants for auparse.
//!
//! Centralising paths, limits and audit message-type codes here keeps the
//! rest of the codebase free of magic numbers.

/// Application display name used by the binary and in log output.
pub const APP_NAME: &str = "auparse";

/// Application version string.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Location of the audit daemon configuration consulted by the `Logs` source.
pub const DEFAULT_AUDITD_CONF: &str = "/etc/audit/auditd.conf";

/// Log file used when `auditd.conf` is missing or has no `log_file` entry.
pub const DEFAULT_LOG_FILE: &str = "/var/log/audit/audit.log";

/// Upper bound when probing rotated logs (`audit.log.1`, `audit.log.2`, ...).
/// auditd never keeps more than this many, and the bound stops a runaway
/// probe on odd file systems.
pub const MAX_ROTATED_LOGS: usize = 999;

/// Default tracing filter for the binary's stderr layer when `RUST_LOG`
/// is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Filter applied to the optional persistent log file layer.
pub const FILE_LOG_FILTER: &str = "debug";

// ── Audit message types referenced by the parser ──────────────────────

/// `USER_AVC`: user-space SELinux access decision.
pub const AUDIT_USER_AVC: u32 = 1107;

/// `EXECVE`: argument vector of an executed program.
pub const AUDIT_EXECVE: u32 = 1309;

/// `AVC`: kernel SELinux access decision.
pub const AUDIT_AVC: u32 = 1400;

// ── Syscall argument constants used by the interpreter ───────────────

/// `fcntl` command that sets the owning process of a descriptor.
pub const F_SETOWN: u64 = 8;

/// Mask selecting the access mode bits of `open` flags.
pub const O_ACCMODE: u64 = 0o3;
