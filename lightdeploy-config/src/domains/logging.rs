//! Logging channel configuration
//!
//! The same section shape drives two independent channels: server
//! diagnostics (top-level `logging`) and access logs (`http.requestLog`).

use crate::document::{invalid_type, ConfigValue, FromConfigValue, Section};
use crate::domains::utils::default_true;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Logging configuration for one channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Threshold for the channel
    pub level: LogLevel,

    /// Per-logger threshold overrides
    pub loggers: BTreeMap<String, LogLevel>,

    /// Active log file; console output when unset
    pub current_log_filename: Option<PathBuf>,

    /// Whether rotated files are kept
    pub archive: bool,

    pub archived_log_filename_pattern: Option<String>,

    pub archived_file_count: u32,

    pub time_zone: String,

    /// Layout pattern handed to the logging backend
    pub log_format: Option<String>,
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Where a channel writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination<'a> {
    Console,
    File(&'a Path),
}

impl LoggingConfig {
    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        let loggers: BTreeMap<String, LogLevel> = match section.child("loggers")? {
            Some(loggers) => loggers
                .entries()
                .filter(|(_, value)| !value.is_null())
                .map(|(name, value)| {
                    let level = LogLevel::from_config_value(value, &loggers.qualify(name))?;
                    Ok((name.to_string(), level))
                })
                .collect::<ConfigResult<_>>()?,
            None => BTreeMap::new(),
        };

        Ok(Self {
            level: section.get("level", LogLevel::default())?,
            loggers,
            current_log_filename: section.get_opt("currentLogFilename")?,
            archive: section.get("archive", default_true())?,
            archived_log_filename_pattern: section.get_opt("archivedLogFilenamePattern")?,
            archived_file_count: section.get("archivedFileCount", default_archived_file_count())?,
            time_zone: section.get("timeZone", default_time_zone())?,
            log_format: section.get_opt("logFormat")?,
        })
    }

    pub fn destination(&self) -> LogDestination<'_> {
        match &self.current_log_filename {
            Some(path) => LogDestination::File(path),
            None => LogDestination::Console,
        }
    }

    /// Effective level for `logger`, falling back to the channel level
    pub fn level_for(&self, logger: &str) -> LogLevel {
        self.loggers.get(logger).copied().unwrap_or(self.level)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            loggers: BTreeMap::new(),
            current_log_filename: None,
            archive: true,
            archived_log_filename_pattern: None,
            archived_file_count: default_archived_file_count(),
            time_zone: default_time_zone(),
            log_format: None,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" | "all" => Ok(LogLevel::Trace),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl FromConfigValue for LogLevel {
    const EXPECTED: &'static str = "log level string";

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
        match value {
            ConfigValue::String(s) => s.parse().map_err(|message| ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            }),
            // YAML 1.1 documents spell `off` as a boolean
            ConfigValue::Bool(false) => Ok(LogLevel::Off),
            other => Err(invalid_type(key, Self::EXPECTED, other)),
        }
    }
}

/// Validation scoped to the channel the section was read for
pub struct LoggingChannel<'a> {
    pub config: &'a LoggingConfig,
    pub domain: &'static str,
}

impl Validatable for LoggingChannel<'_> {
    fn validate(&self) -> ConfigResult<()> {
        let config = self.config;
        validate_required_string(&config.time_zone, "timeZone", self.domain_name())?;

        if config.current_log_filename.is_some() && config.archive {
            validate_positive(
                config.archived_file_count,
                "archivedFileCount",
                self.domain_name(),
            )?;
        }

        if config.archived_log_filename_pattern.is_some() && config.current_log_filename.is_none() {
            return Err(self.validation_error(
                "archivedLogFilenamePattern requires currentLogFilename",
            ));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        self.domain
    }
}

// Default value functions
fn default_archived_file_count() -> u32 {
    5
}

fn default_time_zone() -> String {
    "UTC".to_string()
}
