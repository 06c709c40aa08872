//! Logger configuration snapshot
//!
//! A [`LoggerConfig`] is consumed once by [`Logger::new`](crate::Logger::new).
//! Reconfiguring means building a new logger from a new snapshot. The type
//! derives serde so a configuration layer can load it from any format.
//!
//! # Example
//!
//! ```
//! use rust_log_engine::{LogLevel, LogTarget, LoggerConfig, OutputFormat};
//!
//! let config = LoggerConfig {
//!     level: LogLevel::Debug,
//!     format: OutputFormat::Json,
//!     target: LogTarget::File,
//!     file_path: Some("/var/log/app.log".into()),
//!     max_file_size: 50 * 1024 * 1024,
//!     max_backup_files: 7,
//!     async_mode: true,
//!     ..LoggerConfig::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::output_format::{Capabilities, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default scratch buffer capacity in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default rotation threshold (10 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of rotated backups kept
pub const DEFAULT_MAX_BACKUP_FILES: usize = 5;

/// Where frames are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
    /// Size-rotated file at [`LoggerConfig::file_path`]
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Entries below this level are discarded
    pub level: LogLevel,
    pub format: OutputFormat,
    pub target: LogTarget,
    /// Required when `target` is [`LogTarget::File`]
    pub file_path: Option<PathBuf>,
    /// Initial capacity of the encode buffer
    pub buffer_size: usize,
    /// Rotate once the active file grows past this many bytes
    pub max_file_size: u64,
    /// Backups kept as `path.0` .. `path.(n-1)`; 0 truncates in place
    pub max_backup_files: usize,
    /// Gzip each backup after rotation (`path.0.gz`)
    pub compress_backups: bool,
    /// Fraction of accepted-level entries kept, in (0, 1]
    pub sampling_rate: f64,
    /// Hand frames to a background writer thread
    pub async_mode: bool,
    /// Maximum frames waiting for the writer thread; `None` is unbounded
    pub queue_capacity: Option<usize>,
    /// Formats enabled at runtime
    pub capabilities: Capabilities,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: OutputFormat::Text,
            target: LogTarget::Stdout,
            file_path: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_backup_files: DEFAULT_MAX_BACKUP_FILES,
            compress_backups: false,
            sampling_rate: 1.0,
            async_mode: false,
            queue_capacity: None,
            capabilities: Capabilities::default(),
        }
    }
}

impl LoggerConfig {
    /// Configuration for a rotated file at `path` with all other settings
    /// at their defaults
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: LogTarget::File,
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Reject combinations the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] naming the offending
    /// setting.
    pub fn validate(&self) -> Result<()> {
        if self.target == LogTarget::File && self.file_path.is_none() {
            return Err(LoggerError::config(
                "LoggerConfig",
                "file target requires file_path",
            ));
        }

        if self.buffer_size == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "buffer_size must be greater than zero",
            ));
        }

        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!(
                    "sampling_rate must be a positive finite number, got {}",
                    self.sampling_rate
                ),
            ));
        }

        if self.target == LogTarget::File && self.max_file_size == 0 {
            return Err(LoggerError::config(
                "LoggerConfig",
                "max_file_size must be greater than zero for file targets",
            ));
        }

        if self.queue_capacity == Some(0) {
            return Err(LoggerError::config(
                "LoggerConfig",
                "queue_capacity must be greater than zero when set",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = LoggerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.target, LogTarget::Stdout);
        assert_eq!(config.sampling_rate, 1.0);
        assert!(!config.async_mode);
    }

    #[test]
    fn test_file_target_requires_path() {
        let config = LoggerConfig {
            target: LogTarget::File,
            ..LoggerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("file_path"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad = [
            LoggerConfig {
                buffer_size: 0,
                ..LoggerConfig::default()
            },
            LoggerConfig {
                sampling_rate: 0.0,
                ..LoggerConfig::default()
            },
            LoggerConfig {
                sampling_rate: f64::NAN,
                ..LoggerConfig::default()
            },
            LoggerConfig {
                max_file_size: 0,
                ..LoggerConfig::file("/tmp/app.log")
            },
            LoggerConfig {
                queue_capacity: Some(0),
                ..LoggerConfig::default()
            },
        ];

        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(LoggerError::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: LoggerConfig = serde_json::from_str(
            r#"{
                "level": "WARN",
                "format": "binary",
                "target": "file",
                "file_path": "/var/log/engine.log",
                "sampling_rate": 0.5,
                "capabilities": { "binary": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, OutputFormat::Binary);
        assert_eq!(config.target, LogTarget::File);
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert!(config.capabilities.json);
        assert!(!config.capabilities.binary);
        assert!(config.validate().is_ok());
    }
}
