//! Configuration for the error log
//!
//! The host application builds a [`LogConfig`] once at startup (from
//! defaults, environment variables or a TOML file) and hands it to
//! [`LogStore::open`](crate::event_store::LogStore::open) and
//! [`ErrorHandler::new`](crate::handler::ErrorHandler::new).

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Partition file name prefix
pub const PARTITION_PREFIX: &str = "errors-";

/// Partition and archive file extension
pub const PARTITION_EXTENSION: &str = "jsonl";

/// Default rotation threshold: 5 MiB
pub const DEFAULT_ROTATION_BYTES: u64 = 5 * 1024 * 1024;

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// What retention cleanup does with archive files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchivePolicy {
    /// Archives are rotated history and are never removed by cleanup
    #[default]
    Keep,
    /// Archives older than the retention window are removed with partitions
    PruneExpired,
}

impl ArchivePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keep" => Some(ArchivePolicy::Keep),
            "prune_expired" | "prune" => Some(ArchivePolicy::PruneExpired),
            _ => None,
        }
    }
}

/// Error log configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory holding partitions; archives live in `<log_dir>/archive`
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Expose sanitized technical detail in verdicts (default: false)
    #[serde(default)]
    pub debug_mode: bool,

    /// Partition size that triggers rotation, in bytes (default: 5 MiB)
    #[serde(default = "default_rotation_bytes")]
    pub rotation_bytes: u64,

    /// Partitions older than this many days are removed by cleanup (default: 30)
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,

    #[serde(default)]
    pub archive_policy: ArchivePolicy,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs").join("errors")
}

fn default_rotation_bytes() -> u64 {
    DEFAULT_ROTATION_BYTES
}

fn default_retention_days() -> u64 {
    DEFAULT_RETENTION_DAYS
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            debug_mode: false,
            rotation_bytes: default_rotation_bytes(),
            retention_days: default_retention_days(),
            archive_policy: ArchivePolicy::default(),
        }
    }
}

impl LogConfig {
    /// Create config with custom log directory
    pub fn new<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_rotation_bytes(mut self, bytes: u64) -> Self {
        self.rotation_bytes = bytes;
        self
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention_days = days;
        self
    }

    pub fn with_archive_policy(mut self, policy: ArchivePolicy) -> Self {
        self.archive_policy = policy;
        self
    }

    /// Build config from `FAULTLOG_*` environment variables over defaults
    ///
    /// - `FAULTLOG_DIR`
    /// - `FAULTLOG_DEBUG` (`1`/`true`/`yes`/`on`)
    /// - `FAULTLOG_ROTATE_BYTES`
    /// - `FAULTLOG_RETENTION_DAYS`
    /// - `FAULTLOG_ARCHIVE_POLICY` (`keep` or `prune_expired`)
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("FAULTLOG_DIR").filter(|d| !d.trim().is_empty()) {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup("FAULTLOG_DEBUG") {
            config.debug_mode = parse_flag(&value).ok_or(ConfigError::InvalidValue {
                key: "FAULTLOG_DEBUG",
                value,
            })?;
        }
        if let Some(value) = lookup("FAULTLOG_ROTATE_BYTES") {
            config.rotation_bytes = parse_positive(&value).ok_or(ConfigError::InvalidValue {
                key: "FAULTLOG_ROTATE_BYTES",
                value,
            })?;
        }
        if let Some(value) = lookup("FAULTLOG_RETENTION_DAYS") {
            config.retention_days = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "FAULTLOG_RETENTION_DAYS",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("FAULTLOG_ARCHIVE_POLICY") {
            config.archive_policy =
                ArchivePolicy::parse(&value).ok_or(ConfigError::InvalidValue {
                    key: "FAULTLOG_ARCHIVE_POLICY",
                    value,
                })?;
        }

        Ok(config)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        if config.rotation_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "rotation_bytes",
                value: "0".to_string(),
            });
        }
        Ok(config)
    }

    /// Load configuration from a TOML file, or defaults if it doesn't exist
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Get the log directory path
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Get path to the partition file for `date`
    pub fn partition_path(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(partition_file_name(date))
    }

    /// Get path to archive directory
    pub fn archive_dir(&self) -> PathBuf {
        self.log_dir.join("archive")
    }
}

/// `errors-YYYY-MM-DD.jsonl`
pub fn partition_file_name(date: NaiveDate) -> String {
    format!(
        "{}{}.{}",
        PARTITION_PREFIX,
        date.format("%Y-%m-%d"),
        PARTITION_EXTENSION
    )
}

/// Recover the date from a partition file name
pub fn parse_partition_file_name(name: &str) -> Option<NaiveDate> {
    let stem = name
        .strip_prefix(PARTITION_PREFIX)?
        .strip_suffix(PARTITION_EXTENSION)?
        .strip_suffix('.')?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|v| *v > 0)
}
