//! Configuration validation traits and utilities

use crate::error::{ConfigError, ConfigResult};

/// Trait for validatable configuration
pub trait Validatable {
    /// Validate the configuration
    fn validate(&self) -> ConfigResult<()>;

    /// Get the domain name for error reporting
    fn domain_name(&self) -> &'static str;

    /// Helper to create a domain-specific validation error
    fn validation_error(&self, message: impl Into<String>) -> ConfigError {
        ConfigError::DomainError {
            domain: self.domain_name().to_string(),
            message: message.into(),
        }
    }
}

/// Validate a required string field
pub fn validate_required_string(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} cannot be empty", field_name),
        });
    }
    Ok(())
}

/// Validate a positive number
pub fn validate_positive<T>(value: T, field_name: &str, domain: &str) -> ConfigResult<()>
where
    T: PartialOrd + Default + std::fmt::Display,
{
    if value <= T::default() {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must be greater than 0, got {}", field_name, value),
        });
    }
    Ok(())
}

/// Validate that `lower <= upper`
pub fn validate_ordered<T>(
    lower: T,
    lower_name: &str,
    upper: T,
    upper_name: &str,
    domain: &str,
) -> ConfigResult<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if lower > upper {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!(
                "{} ({}) must not exceed {} ({})",
                lower_name, lower, upper_name, upper
            ),
        });
    }
    Ok(())
}

/// Validate a URL-style path that must be absolute
pub fn validate_absolute_path(value: &str, field_name: &str, domain: &str) -> ConfigResult<()> {
    if !value.starts_with('/') {
        return Err(ConfigError::DomainError {
            domain: domain.to_string(),
            message: format!("{} must start with '/', got '{}'", field_name, value),
        });
    }
    Ok(())
}

/// Validate a port number
///
/// Port 0 asks the OS for an ephemeral port and is accepted as is.
pub fn validate_port_range(port: u16, field_name: &str, domain: &str) -> ConfigResult<()> {
    if port == 0 {
        log::debug!("{} {} binds an ephemeral port", domain, field_name);
        return Ok(());
    }

    // Port 1-1023 are typically reserved for system services
    if port <= 1023 {
        log::warn!("{} port {} is in the reserved range (1-1023)", field_name, port);
    }

    Ok(())
}
