//! Configuration loading and environment variable handling

use crate::document::ConfigValue;
use crate::domains::ServerConfig;
use crate::error::{ConfigError, ConfigResult};
use std::env::VarError;
use std::path::Path;

/// How the raw text of an environment override enters the document
#[derive(Debug, Clone, Copy)]
enum OverrideKind {
    /// Parsed like a plain YAML scalar (integers and booleans recognised)
    Scalar,
    /// Kept verbatim as a string
    Text,
}

/// Environment variable suffixes and the document keys they override
const ENV_OVERRIDES: &[(&str, &[&str], OverrideKind)] = &[
    ("HTTP_PORT", &["http", "port"], OverrideKind::Scalar),
    ("ADMIN_PORT", &["http", "adminPort"], OverrideKind::Scalar),
    ("MIN_THREADS", &["http", "minThreads"], OverrideKind::Scalar),
    ("MAX_THREADS", &["http", "maxThreads"], OverrideKind::Scalar),
    ("WORK_DIR", &["workDir"], OverrideKind::Text),
    ("LOG_LEVEL", &["logging", "level"], OverrideKind::Text),
];

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "LIGHTDEPLOY".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML (or `.json`) file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<ServerConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        log::debug!("loading configuration from {}", path.display());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let document: ConfigValue = if is_json {
            serde_json::from_str::<serde_json::Value>(&content)?.into()
        } else {
            parse_yaml(&content)?
        };

        self.from_value(document)
    }

    /// Load configuration from YAML text with environment overrides
    pub fn from_yaml_str(&self, content: &str) -> ConfigResult<ServerConfig> {
        self.from_value(parse_yaml(content)?)
    }

    /// Resolve an already loaded document with environment overrides
    pub fn from_value(&self, mut document: ConfigValue) -> ConfigResult<ServerConfig> {
        self.apply_env_overrides(&mut document)?;
        ServerConfig::resolve(&document)
    }

    /// Apply environment variable overrides to the document
    fn apply_env_overrides(&self, document: &mut ConfigValue) -> ConfigResult<()> {
        for (name, path, kind) in ENV_OVERRIDES {
            let Some(raw) = self.get_env_var(name)? else {
                continue;
            };
            log::debug!("overriding {} from {}_{}", path.join("."), self.prefix, name);
            let value = match kind {
                OverrideKind::Scalar => ConfigValue::from_env_str(&raw),
                OverrideKind::Text => ConfigValue::String(raw),
            };
            document.set_path(path, value)?;
        }
        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> ConfigResult<Option<String>> {
        let key = format!("{}_{}", self.prefix, name);
        match std::env::var(&key) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::EnvError(format!(
                "{} is not valid unicode",
                key
            ))),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_yaml(content: &str) -> ConfigResult<ConfigValue> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
    ConfigValue::try_from(raw)
}
