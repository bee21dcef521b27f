//! Remote management (JMX) endpoint configuration

use crate::document::Section;
use crate::error::{ConfigError, ConfigResult};
use crate::validation::{validate_port_range, Validatable};
use serde::Serialize;

/// Management endpoint ports, read from the top-level `jmx` section.
///
/// Both ports are mandatory once the section is declared; a half-configured
/// endpoint is rejected instead of being silently disabled. The registry and
/// the connector server may share one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JmxConfig {
    /// RMI registry port
    pub registry_port: u16,

    /// RMI connector server port
    pub server_port: u16,
}

impl JmxConfig {
    pub fn new(registry_port: u16, server_port: u16) -> Self {
        Self {
            registry_port,
            server_port,
        }
    }

    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        let registry_port: Option<u16> = section.get_opt("registryPort")?;
        let server_port: Option<u16> = section.get_opt("serverPort")?;

        match (registry_port, server_port) {
            (Some(registry_port), Some(server_port)) => Ok(Self::new(registry_port, server_port)),
            (registry_port, server_port) => {
                let mut missing = Vec::new();
                if registry_port.is_none() {
                    missing.push("registryPort".to_string());
                }
                if server_port.is_none() {
                    missing.push("serverPort".to_string());
                }
                Err(ConfigError::IncompleteSection {
                    section: section.path().to_string(),
                    missing,
                })
            }
        }
    }

    /// Connector address a remote client dials for this endpoint on `host`
    pub fn service_url(&self, host: &str) -> String {
        format!(
            "service:jmx:rmi://{host}:{}/jndi/rmi://{host}:{}/jmxrmi",
            self.server_port, self.registry_port
        )
    }
}

impl Validatable for JmxConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_port_range(self.registry_port, "registryPort", self.domain_name())?;
        validate_port_range(self.server_port, "serverPort", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "jmx"
    }
}
