//! Domain-specific configuration sections and the root resolver

pub mod gzip;
pub mod http;
pub mod jmx;
pub mod logging;
pub mod sessions;
pub mod ssl;
pub mod utils;

use crate::document::{ConfigValue, Section};
use crate::error::{ConfigError, ConfigResult};
use crate::validation::Validatable;
use logging::LoggingChannel;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Fully resolved server configuration.
///
/// Built once by [`ServerConfig::resolve`] and read-only afterwards. Sections
/// that are off unless declared (TLS, both log channels, JMX) are `Option`s;
/// sessions and gzip always carry a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    http: http::HttpConfig,
    ssl: Option<ssl::SslConfig>,
    jmx: Option<jmx::JmxConfig>,
    server_log: Option<logging::LoggingConfig>,
    request_log: Option<logging::LoggingConfig>,
    work_dir: PathBuf,
}

impl ServerConfig {
    /// Resolve and validate a loaded document.
    ///
    /// Pure apart from the platform temp directory lookup used when
    /// `workDir` is absent.
    pub fn resolve(document: &ConfigValue) -> ConfigResult<Self> {
        let root = Section::root(document)?;

        let http_section = root.child("http")?.ok_or_else(|| ConfigError::MissingSection {
            section: "http".to_string(),
        })?;
        let http = http::HttpConfig::from_section(&http_section)?;
        log::debug!(
            "resolved http section: port {}, admin port {:?}, threads {}..={}",
            http.port,
            http.admin_port,
            http.min_threads,
            http.max_threads
        );

        let ssl = http_section
            .child("ssl")?
            .map(|section| ssl::SslConfig::from_section(&section))
            .transpose()?;
        log::debug!("resolved ssl section: {:?}", ssl.as_ref().map(|s| s.port));

        let jmx = root
            .child("jmx")?
            .map(|section| jmx::JmxConfig::from_section(&section))
            .transpose()?;

        let server_log = root
            .child("logging")?
            .map(|section| logging::LoggingConfig::from_section(&section))
            .transpose()?;

        let request_log = http_section
            .child("requestLog")?
            .map(|section| logging::LoggingConfig::from_section(&section))
            .transpose()?;

        let work_dir = root
            .get_opt::<PathBuf>("workDir")?
            .unwrap_or_else(std::env::temp_dir);

        let config = Self {
            http,
            ssl,
            jmx,
            server_log,
            request_log,
            work_dir,
        };
        config.validate()?;

        log::debug!("resolved configuration: {}", config);
        Ok(config)
    }

    pub fn http(&self) -> &http::HttpConfig {
        &self.http
    }

    pub fn port(&self) -> u16 {
        self.http.port
    }

    pub fn admin_port(&self) -> Option<u16> {
        self.http.admin_port
    }

    pub fn min_threads(&self) -> u32 {
        self.http.min_threads
    }

    pub fn max_threads(&self) -> u32 {
        self.http.max_threads
    }

    pub fn ssl(&self) -> Option<&ssl::SslConfig> {
        self.ssl.as_ref()
    }

    pub fn jmx(&self) -> Option<&jmx::JmxConfig> {
        self.jmx.as_ref()
    }

    pub fn server_log(&self) -> Option<&logging::LoggingConfig> {
        self.server_log.as_ref()
    }

    pub fn request_log(&self) -> Option<&logging::LoggingConfig> {
        self.request_log.as_ref()
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn has_admin_port(&self) -> bool {
        self.http.has_admin_port()
    }

    pub fn has_management_endpoint(&self) -> bool {
        self.jmx.is_some()
    }

    pub fn is_jmx_enabled(&self) -> bool {
        self.has_management_endpoint()
    }

    pub fn is_ssl(&self) -> bool {
        self.ssl.is_some()
    }

    /// Plaintext and TLS traffic are served on two distinct ports.
    ///
    /// A TLS section without its own port terminates on the primary port.
    pub fn is_mixed_mode(&self) -> bool {
        self.ssl
            .as_ref()
            .and_then(|ssl| ssl.port)
            .is_some_and(|port| port != self.http.port)
    }

    pub fn is_server_logging_enabled(&self) -> bool {
        self.server_log.is_some()
    }

    pub fn is_request_logging_enabled(&self) -> bool {
        self.request_log.is_some()
    }

    /// Every port a listener binds, paired with the key that configures it
    pub fn listener_ports(&self) -> Vec<(&'static str, u16)> {
        let mut ports = vec![("http.port", self.http.port)];
        if let Some(admin_port) = self.http.admin_port {
            ports.push(("http.adminPort", admin_port));
        }
        if self.is_mixed_mode() {
            if let Some(port) = self.ssl.as_ref().and_then(|ssl| ssl.port) {
                ports.push(("http.ssl.port", port));
            }
        }
        if let Some(jmx) = &self.jmx {
            ports.push(("jmx.registryPort", jmx.registry_port));
            if jmx.server_port != jmx.registry_port {
                ports.push(("jmx.serverPort", jmx.server_port));
            }
        }
        ports
    }

    /// Generate a sample configuration document
    pub fn generate_sample() -> String {
        let mut http = http::HttpConfig::new(8080);
        http.admin_port = Some(8081);

        let sample = ServerConfig {
            http,
            ssl: Some(ssl::SslConfig {
                port: Some(8443),
                key_store_path: Some(PathBuf::from("/etc/lightdeploy/keystore.jks")),
                ..ssl::SslConfig::default()
            }),
            jmx: Some(jmx::JmxConfig::new(9000, 9001)),
            server_log: Some(logging::LoggingConfig::default()),
            request_log: Some(logging::LoggingConfig {
                current_log_filename: Some(PathBuf::from("/var/log/lightdeploy/request.log")),
                archived_log_filename_pattern: Some(
                    "/var/log/lightdeploy/request-%d.log.gz".to_string(),
                ),
                ..logging::LoggingConfig::default()
            }),
            work_dir: PathBuf::from("/var/lib/lightdeploy"),
        };

        serde_yaml::to_string(&sample)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> ConfigResult<()> {
        self.http.validate()?;

        if let Some(ref ssl) = self.ssl {
            ssl.validate()?;
        }

        if let Some(ref jmx) = self.jmx {
            jmx.validate()?;
        }

        if let Some(ref server_log) = self.server_log {
            LoggingChannel {
                config: server_log,
                domain: "logging",
            }
            .validate()?;
        }

        if let Some(ref request_log) = self.request_log {
            LoggingChannel {
                config: request_log,
                domain: "http.requestLog",
            }
            .validate()?;
        }

        let mut seen: BTreeMap<u16, &'static str> = BTreeMap::new();
        // Port 0 hands every listener its own ephemeral port
        for (key, port) in self.listener_ports().into_iter().filter(|(_, p)| *p != 0) {
            if let Some(previous) = seen.insert(port, key) {
                return Err(self.validation_error(format!(
                    "{} and {} both use port {}",
                    previous, key, port
                )));
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "server"
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port={}", self.http.port)?;
        match self.http.admin_port {
            Some(admin_port) => write!(f, " admin_port={}", admin_port)?,
            None => write!(f, " admin_port=none")?,
        }
        write!(f, " ssl={}", self.is_ssl())
    }
}

/// Serialized in the shape of the input document, so output can be loaded again
impl Serialize for ServerConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct HttpDocument<'a> {
            #[serde(flatten)]
            http: &'a http::HttpConfig,
            #[serde(skip_serializing_if = "Option::is_none")]
            ssl: Option<&'a ssl::SslConfig>,
            #[serde(skip_serializing_if = "Option::is_none")]
            request_log: Option<&'a logging::LoggingConfig>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Document<'a> {
            http: HttpDocument<'a>,
            #[serde(skip_serializing_if = "Option::is_none")]
            logging: Option<&'a logging::LoggingConfig>,
            #[serde(skip_serializing_if = "Option::is_none")]
            jmx: Option<&'a jmx::JmxConfig>,
            work_dir: &'a Path,
        }

        Document {
            http: HttpDocument {
                http: &self.http,
                ssl: self.ssl.as_ref(),
                request_log: self.request_log.as_ref(),
            },
            logging: self.server_log.as_ref(),
            jmx: self.jmx.as_ref(),
            work_dir: &self.work_dir,
        }
        .serialize(serializer)
    }
}
