//! Configuration resolution for an embedded HTTP server
//!
//! This crate turns an untyped, nested key-value document (usually YAML)
//! into a validated [`ServerConfig`]: listener ports, TLS, thread pool and
//! buffer sizing, sessions, compression, request and server logging, a
//! working directory and an optional JMX management endpoint.

pub mod document;
pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use document::{ConfigMap, ConfigValue, Section};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

// Re-export domain configurations
pub use domains::{
    gzip::GzipConfig,
    http::{ConnectorConfig, HttpConfig},
    jmx::JmxConfig,
    logging::{LogDestination, LogLevel, LoggingConfig},
    sessions::SessionsConfig,
    ssl::SslConfig,
    ServerConfig,
};
