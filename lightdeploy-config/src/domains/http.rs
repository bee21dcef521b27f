//! HTTP listener configuration

use crate::document::Section;
use crate::domains::gzip::GzipConfig;
use crate::domains::sessions::SessionsConfig;
use crate::domains::utils::default_true;
use crate::error::ConfigResult;
use crate::validation::{
    validate_absolute_path, validate_ordered, validate_port_range, validate_positive, Validatable,
};
use serde::Serialize;
use std::time::Duration;

/// HTTP listener configuration, read from the `http` section.
///
/// Only `port` is mandatory. TLS and the request log live in the same
/// mapping but are resolved by the root so they can stay optional.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Primary (plaintext or shared TLS) listener port
    pub port: u16,

    /// Separate administrative listener
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_port: Option<u16>,

    /// Minimum worker threads
    pub min_threads: u32,

    /// Maximum worker threads
    pub max_threads: u32,

    /// Connector tuning
    #[serde(flatten)]
    pub connector: ConnectorConfig,

    /// Session handling
    pub sessions: SessionsConfig,

    /// Response compression
    pub gzip: GzipConfig,
}

/// Connector tuning knobs. Every field has a built-in default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    pub context_path: String,

    /// Idle time before an open connection is closed
    #[serde(serialize_with = "crate::domains::utils::serde_millis::serialize")]
    pub max_idle_time: Duration,

    pub acceptor_threads: u32,

    pub acceptor_thread_priority_offset: i32,

    /// Listen backlog; negative lets the OS choose
    pub accept_queue_size: i32,

    pub max_buffer_count: u32,

    pub request_buffer_size: u32,

    pub request_header_buffer_size: u32,

    pub response_buffer_size: u32,

    pub response_header_buffer_size: u32,

    pub reuse_address: bool,

    /// SO_LINGER; platform default when unset
    #[serde(serialize_with = "crate::domains::utils::serde_millis_option::serialize")]
    pub so_linger_time: Option<Duration>,

    /// Idle time applied instead of `max_idle_time` while resources run low
    #[serde(serialize_with = "crate::domains::utils::serde_millis::serialize")]
    pub low_resources_max_idle_time: Duration,
}

impl HttpConfig {
    /// Create a configuration listening on `port` with every other field defaulted
    pub fn new(port: u16) -> Self {
        Self {
            port,
            admin_port: None,
            min_threads: default_min_threads(),
            max_threads: default_max_threads(),
            connector: ConnectorConfig::default(),
            sessions: SessionsConfig::default(),
            gzip: GzipConfig::default(),
        }
    }

    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        let sessions = match section.child("sessions")? {
            Some(sessions) => SessionsConfig::from_section(&sessions)?,
            None => SessionsConfig::default(),
        };
        let gzip = match section.child("gzip")? {
            Some(gzip) => GzipConfig::from_section(&gzip)?,
            None => GzipConfig::default(),
        };

        Ok(Self {
            port: section.require("port")?,
            admin_port: section.get_opt("adminPort")?,
            min_threads: section.get("minThreads", default_min_threads())?,
            max_threads: section.get("maxThreads", default_max_threads())?,
            connector: ConnectorConfig::from_section(section)?,
            sessions,
            gzip,
        })
    }

    pub fn has_admin_port(&self) -> bool {
        self.admin_port.is_some()
    }
}

impl ConnectorConfig {
    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        Ok(Self {
            context_path: section.get("contextPath", default_context_path())?,
            max_idle_time: section.get("maxIdleTime", default_max_idle_time())?,
            acceptor_threads: section.get("acceptorThreads", default_acceptor_threads())?,
            acceptor_thread_priority_offset: section.get("acceptorThreadPriorityOffset", 0)?,
            accept_queue_size: section.get("acceptQueueSize", default_accept_queue_size())?,
            max_buffer_count: section.get("maxBufferCount", default_max_buffer_count())?,
            request_buffer_size: section
                .get("requestBufferSize", default_request_buffer_size())?,
            request_header_buffer_size: section
                .get("requestHeaderBufferSize", default_header_buffer_size())?,
            response_buffer_size: section
                .get("responseBufferSize", default_response_buffer_size())?,
            response_header_buffer_size: section
                .get("responseHeaderBufferSize", default_header_buffer_size())?,
            reuse_address: section.get("reuseAddress", default_true())?,
            so_linger_time: section.get_opt("soLingerTime")?,
            low_resources_max_idle_time: section.get("lowResourcesMaxIdleTime", Duration::ZERO)?,
        })
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            context_path: default_context_path(),
            max_idle_time: default_max_idle_time(),
            acceptor_threads: default_acceptor_threads(),
            acceptor_thread_priority_offset: 0,
            accept_queue_size: default_accept_queue_size(),
            max_buffer_count: default_max_buffer_count(),
            request_buffer_size: default_request_buffer_size(),
            request_header_buffer_size: default_header_buffer_size(),
            response_buffer_size: default_response_buffer_size(),
            response_header_buffer_size: default_header_buffer_size(),
            reuse_address: true,
            so_linger_time: None,
            low_resources_max_idle_time: Duration::ZERO,
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_port_range(self.port, "port", self.domain_name())?;
        if let Some(admin_port) = self.admin_port {
            validate_port_range(admin_port, "adminPort", self.domain_name())?;
            if admin_port == self.port && admin_port != 0 {
                return Err(self.validation_error(format!(
                    "adminPort must differ from port (both {})",
                    self.port
                )));
            }
        }

        validate_positive(self.min_threads, "minThreads", self.domain_name())?;
        validate_positive(self.max_threads, "maxThreads", self.domain_name())?;
        validate_ordered(
            self.min_threads,
            "minThreads",
            self.max_threads,
            "maxThreads",
            self.domain_name(),
        )?;

        self.connector.validate()?;
        self.sessions.validate()?;
        self.gzip.validate()?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

impl Validatable for ConnectorConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_absolute_path(&self.context_path, "contextPath", self.domain_name())?;
        validate_positive(self.acceptor_threads, "acceptorThreads", self.domain_name())?;
        validate_positive(self.max_buffer_count, "maxBufferCount", self.domain_name())?;
        validate_positive(self.request_buffer_size, "requestBufferSize", self.domain_name())?;
        validate_positive(
            self.request_header_buffer_size,
            "requestHeaderBufferSize",
            self.domain_name(),
        )?;
        validate_positive(self.response_buffer_size, "responseBufferSize", self.domain_name())?;
        validate_positive(
            self.response_header_buffer_size,
            "responseHeaderBufferSize",
            self.domain_name(),
        )?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

// Default value functions
fn default_min_threads() -> u32 {
    8
}

fn default_max_threads() -> u32 {
    128
}

fn default_context_path() -> String {
    "/".to_string()
}

fn default_max_idle_time() -> Duration {
    Duration::from_secs(200)
}

fn default_acceptor_threads() -> u32 {
    1
}

fn default_accept_queue_size() -> i32 {
    -1
}

fn default_max_buffer_count() -> u32 {
    1024
}

fn default_request_buffer_size() -> u32 {
    16 * 1024
}

fn default_header_buffer_size() -> u32 {
    6 * 1024
}

fn default_response_buffer_size() -> u32 {
    32 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfigValue;
    use crate::error::ConfigError;

    fn http(yaml: &str) -> ConfigResult<HttpConfig> {
        let raw: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        let document = ConfigValue::try_from(raw).unwrap();
        let root = Section::root(&document).unwrap();
        HttpConfig::from_section(&root.child("http").unwrap().unwrap())
    }

    #[test]
    fn test_http_config_defaults() {
        let config = http("http:\n  port: 8080\n").unwrap();
        assert_eq!(config, HttpConfig::new(8080));
        assert_eq!(config.admin_port, None);
        assert_eq!(config.min_threads, 8);
        assert_eq!(config.max_threads, 128);

        let connector = &config.connector;
        assert_eq!(connector.context_path, "/");
        assert_eq!(connector.max_idle_time, Duration::from_millis(200_000));
        assert_eq!(connector.acceptor_threads, 1);
        assert_eq!(connector.accept_queue_size, -1);
        assert_eq!(connector.max_buffer_count, 1024);
        assert_eq!(connector.request_buffer_size, 16384);
        assert_eq!(connector.request_header_buffer_size, 6144);
        assert_eq!(connector.response_buffer_size, 32768);
        assert_eq!(connector.response_header_buffer_size, 6144);
        assert!(connector.reuse_address);
        assert_eq!(connector.so_linger_time, None);
        assert_eq!(connector.low_resources_max_idle_time, Duration::ZERO);

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_config_tuning() {
        let config = http(
            "http:\n  port: 8080\n  adminPort: 8081\n  contextPath: /api\n  maxIdleTime: 30000\n  acceptQueueSize: 100\n  reuseAddress: false\n  soLingerTime: 500\n  sessions:\n    cookieName: SID\n  gzip:\n    enabled: false\n",
        )
        .unwrap();

        assert_eq!(config.admin_port, Some(8081));
        assert!(config.has_admin_port());
        assert_eq!(config.connector.context_path, "/api");
        assert_eq!(config.connector.max_idle_time, Duration::from_secs(30));
        assert_eq!(config.connector.accept_queue_size, 100);
        assert!(!config.connector.reuse_address);
        assert_eq!(config.connector.so_linger_time, Some(Duration::from_millis(500)));
        assert_eq!(config.sessions.cookie_name, "SID");
        assert!(!config.gzip.enabled);
    }

    #[test]
    fn test_http_port_is_required() {
        match http("http:\n  adminPort: 8081\n").unwrap_err() {
            ConfigError::MissingField { key } => assert_eq!(key, "http.port"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_http_config_validation() {
        let mut config = HttpConfig::new(8080);
        config.min_threads = 200;
        assert!(config.validate().is_err());

        config = HttpConfig::new(8080);
        config.admin_port = Some(8080);
        assert!(config.validate().is_err());

        config = HttpConfig::new(8080);
        config.connector.request_buffer_size = 0;
        assert!(config.validate().is_err());

        config = HttpConfig::new(8080);
        config.connector.context_path = "api".to_string();
        assert!(config.validate().is_err());

        config = HttpConfig::new(8080);
        config.sessions.cookie_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialized_keys_match_document_keys() {
        let json = serde_json::to_value(HttpConfig::new(8080)).unwrap();
        assert_eq!(json["port"], 8080);
        assert_eq!(json["requestBufferSize"], 16384);
        assert_eq!(json["maxIdleTime"], 200_000);
        assert!(json.get("adminPort").is_none());
    }
}
