//! `auditd.conf` loader.
//!
//! Only the settings the parser needs are kept. The file format is
//! `key = value` per line with `#` comments; unknown keys are ignored.

use crate::util::constants;
use crate::util::error::{AuparseError, Result};
use std::path::{Path, PathBuf};

/// Settings read from the audit daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditdConfig {
    /// Path of the active audit log (`log_file`).
    pub log_file: PathBuf,
}

impl Default for AuditdConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from(constants::DEFAULT_LOG_FILE),
        }
    }
}

impl AuditdConfig {
    /// Load the configuration at `path`.
    ///
    /// A missing file is not an error: the defaults are used and a warning
    /// is logged, matching how the audit tools behave on hosts without a
    /// daemon configuration.
    ///
    /// # Errors
    /// Returns [`AuparseError::Config`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    "{} not found, using default log file {}",
                    path.display(),
                    constants::DEFAULT_LOG_FILE
                );
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AuparseError::Config(format!(
                    "cannot read {}: {e}",
                    path.display()
                )))
            }
        };
        Ok(Self::parse(&text))
    }

    /// Parse configuration text. Malformed lines are skipped.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                tracing::trace!("auditd.conf line {}: no '=', skipped", lineno + 1);
                continue;
            };
            let value = value.trim();
            if key.trim() == "log_file" && !value.is_empty() {
                config.log_file = PathBuf::from(value);
            }
        }
        config
    }

    /// Enumerate the rotated log set, oldest first.
    ///
    /// Probes `log_file.1`, `log_file.2`, ... until one is missing, then
    /// returns them highest number first followed by `log_file` itself.
    ///
    /// # Errors
    /// Returns [`AuparseError::Config`] if the active log file does not exist.
    pub fn rotated_log_files(&self) -> Result<Vec<PathBuf>> {
        if !self.log_file.is_file() {
            return Err(AuparseError::Config(format!(
                "audit log {} does not exist",
                self.log_file.display()
            )));
        }

        let base = self.log_file.as_os_str().to_os_string();
        let mut rotated = Vec::new();
        for n in 1..=constants::MAX_ROTATED_LOGS {
            let mut name = base.clone();
            name.push(format!(".{n}"));
            let candidate = PathBuf::from(name);
            if !candidate.is_file() {
                break;
            }
            rotated.push(candidate);
        }

        rotated.reverse();
        rotated.push(self.log_file.clone());
        tracing::debug!("Found {} audit log file(s)", rotated.len());
        Ok(rotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_file() {
        let cfg = AuditdConfig::parse("# comment\nlog_file = /tmp/a.log\nflush = INCREMENTAL\n");
        assert_eq!(cfg.log_file, PathBuf::from("/tmp/a.log"));
    }

    #[test]
    fn test_parse_defaults_when_absent() {
        let cfg = AuditdConfig::parse("num_logs = 5\nbogus line\n");
        assert_eq!(cfg, AuditdConfig::default());
    }

    #[test]
    fn test_rotated_order_oldest_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let base = dir.path().join("audit.log");
        for name in ["audit.log", "audit.log.1", "audit.log.2"] {
            std::fs::write(dir.path().join(name), "").expect("write");
        }
        let cfg = AuditdConfig { log_file: base.clone() };
        let files = cfg.rotated_log_files().expect("rotated set");
        assert_eq!(
            files,
            vec![
                dir.path().join("audit.log.2"),
                dir.path().join("audit.log.1"),
                base,
            ]
        );
    }

    #[test]
    fn test_rotated_missing_base() {
        let cfg = AuditdConfig {
            log_file: PathBuf::from("/nonexistent_auparse_dir/audit.log"),
        };
        assert!(cfg.rotated_log_files().is_err());
    }
}
