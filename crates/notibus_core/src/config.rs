//! Store configuration and caller identity.
//!
//! # Responsibility
//! - Carry the knobs the local store and text renderer read at runtime.
//! - Resolve the calling process identity stamped onto new records.
//!
//! # Invariants
//! - `delete_burst` and `text_limit` are always non-zero after validation.
//! - Process identity is detected at most once per process.

use crate::error::{NotiError, NotiResult};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default number of ids bound into one `DELETE ... IN (...)` statement.
pub const DEFAULT_DELETE_BURST: usize = 10;
/// Default cap, in bytes, of rendered templated text.
pub const DEFAULT_TEXT_LIMIT: usize = 4096;
const DEFAULT_DB_FILE_NAME: &str = "notibus.sqlite3";
const CALLER_PACKAGE_ENV: &str = "NOTIBUS_CALLER_PACKAGE";

static PROCESS_IDENTITY: OnceCell<ProcessIdentity> = OnceCell::new();

/// Whether a SIM card is currently present on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimStatus {
    #[default]
    Present,
    Absent,
}

/// Runtime configuration for the local notification store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file opened for every store call.
    pub db_path: PathBuf,
    /// Ids per batched delete statement.
    pub delete_burst: usize,
    /// Byte cap for rendered templated text.
    pub text_limit: usize,
    /// SIM environment used to filter SIM-mode-only rows.
    pub sim: SimStatus,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            delete_burst: DEFAULT_DELETE_BURST,
            text_limit: DEFAULT_TEXT_LIMIT,
            sim: SimStatus::Present,
        }
    }
}

impl StoreConfig {
    /// Creates a default configuration rooted at `db_path`.
    pub fn with_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Loads a configuration from JSON; missing keys fall back to defaults.
    pub fn from_json_str(source: &str) -> NotiResult<Self> {
        let config: Self = serde_json::from_str(source)
            .map_err(|err| NotiError::invalid(format!("malformed store config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> NotiResult<()> {
        if self.delete_burst == 0 {
            return Err(NotiError::invalid("delete_burst must be positive"));
        }
        if self.text_limit == 0 {
            return Err(NotiError::invalid("text_limit must be positive"));
        }
        if self.db_path.as_os_str().is_empty() {
            return Err(NotiError::invalid("db_path cannot be empty"));
        }
        Ok(())
    }
}

/// Identity of the process that creates notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub package: String,
    pub uid: i32,
}

impl ProcessIdentity {
    pub fn new(package: impl Into<String>, uid: i32) -> Self {
        Self {
            package: package.into(),
            uid,
        }
    }

    /// Returns the identity of the running process, detected once.
    pub fn current() -> &'static ProcessIdentity {
        PROCESS_IDENTITY.get_or_init(Self::detect)
    }

    fn detect() -> Self {
        let package = std::env::var(CALLER_PACKAGE_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| {
                std::env::current_exe().ok().and_then(|path| {
                    path.file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                })
            })
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            package,
            uid: detect_uid().unwrap_or(0),
        }
    }
}

fn detect_uid() -> Option<i32> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status
        .lines()
        .find_map(|line| line.strip_prefix("Uid:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{SimStatus, StoreConfig, DEFAULT_DELETE_BURST};

    #[test]
    fn json_config_fills_missing_keys_with_defaults() {
        let config = StoreConfig::from_json_str(r#"{"db_path":"/tmp/n.db","sim":"absent"}"#)
            .expect("config should parse");
        assert_eq!(config.delete_burst, DEFAULT_DELETE_BURST);
        assert_eq!(config.sim, SimStatus::Absent);
    }

    #[test]
    fn zero_burst_is_rejected() {
        let err = StoreConfig::from_json_str(r#"{"delete_burst":0}"#)
            .expect_err("zero burst must be rejected");
        assert_eq!(err.code(), "invalid_parameter");
    }
}
