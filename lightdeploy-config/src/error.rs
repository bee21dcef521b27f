//! Configuration error types

use thiserror::Error;

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error reading configuration file
    #[error("Failed to read config file: {0}")]
    FileReadError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A value exists at `key` but has the wrong type
    #[error("Invalid type for '{key}': expected {expected}, found {found}")]
    InvalidType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value has the right type but cannot be used
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// A required top-level section is absent
    #[error("Missing required section '{section}'")]
    MissingSection { section: String },

    /// A required field has no value and no default
    #[error("Missing required field '{key}'")]
    MissingField { key: String },

    /// A declared section lacks fields it cannot work without
    #[error("Incomplete section '{section}': missing {}", .missing.join(", "))]
    IncompleteSection {
        section: String,
        missing: Vec<String>,
    },

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvError(String),

    /// Domain-specific configuration error
    #[error("Domain configuration error in {domain}: {message}")]
    DomainError { domain: String, message: String },
}

impl ConfigError {
    /// Dotted key the error refers to, when it points at a single field
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidType { key, .. }
            | ConfigError::InvalidValue { key, .. }
            | ConfigError::MissingField { key } => Some(key),
            ConfigError::MissingSection { section }
            | ConfigError::IncompleteSection { section, .. } => Some(section),
            _ => None,
        }
    }
}
