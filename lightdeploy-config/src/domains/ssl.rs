//! TLS termination configuration

use crate::document::Section;
use crate::domains::utils::{default_false, default_store_type, default_true};
use crate::error::ConfigResult;
use crate::validation::{validate_port_range, Validatable};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// TLS configuration, read from `http.ssl`.
///
/// The section only exists when the document declares it; there is no
/// "disabled" variant. Store passwords are never serialized or printed.
#[derive(Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SslConfig {
    /// Dedicated TLS listener port; `None` means TLS shares the primary port
    pub port: Option<u16>,

    pub key_store_path: Option<PathBuf>,

    #[serde(skip_serializing)]
    pub key_store_password: Option<String>,

    #[serde(skip_serializing)]
    pub key_manager_password: Option<String>,

    pub key_store_type: String,

    /// Alias of the certificate to present when the store holds several
    pub cert_alias: Option<String>,

    pub trust_store_path: Option<PathBuf>,

    #[serde(skip_serializing)]
    pub trust_store_password: Option<String>,

    pub trust_store_type: String,

    pub need_client_auth: bool,

    pub want_client_auth: bool,

    pub allow_renegotiate: bool,

    pub supported_protocols: Vec<String>,
}

impl SslConfig {
    /// Build the section from its mapping
    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        Ok(Self {
            port: section.get_opt("port")?,
            key_store_path: section.get_opt("keyStorePath")?,
            key_store_password: section.get_opt("keyStorePassword")?,
            key_manager_password: section.get_opt("keyManagerPassword")?,
            key_store_type: section.get("keyStoreType", default_store_type())?,
            cert_alias: section.get_opt("certAlias")?,
            trust_store_path: section.get_opt("trustStorePath")?,
            trust_store_password: section.get_opt("trustStorePassword")?,
            trust_store_type: section.get("trustStoreType", default_store_type())?,
            need_client_auth: section.get("needClientAuth", default_false())?,
            want_client_auth: section.get("wantClientAuth", default_false())?,
            allow_renegotiate: section.get("allowRenegotiate", default_true())?,
            supported_protocols: section.get("supportedProtocols", default_supported_protocols())?,
        })
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self {
            port: None,
            key_store_path: None,
            key_store_password: None,
            key_manager_password: None,
            key_store_type: default_store_type(),
            cert_alias: None,
            trust_store_path: None,
            trust_store_password: None,
            trust_store_type: default_store_type(),
            need_client_auth: false,
            want_client_auth: false,
            allow_renegotiate: true,
            supported_protocols: default_supported_protocols(),
        }
    }
}

impl fmt::Debug for SslConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(secret: &Option<String>) -> Option<&'static str> {
            secret.as_ref().map(|_| "<redacted>")
        }

        f.debug_struct("SslConfig")
            .field("port", &self.port)
            .field("key_store_path", &self.key_store_path)
            .field("key_store_password", &redact(&self.key_store_password))
            .field("key_manager_password", &redact(&self.key_manager_password))
            .field("key_store_type", &self.key_store_type)
            .field("cert_alias", &self.cert_alias)
            .field("trust_store_path", &self.trust_store_path)
            .field("trust_store_password", &redact(&self.trust_store_password))
            .field("trust_store_type", &self.trust_store_type)
            .field("need_client_auth", &self.need_client_auth)
            .field("want_client_auth", &self.want_client_auth)
            .field("allow_renegotiate", &self.allow_renegotiate)
            .field("supported_protocols", &self.supported_protocols)
            .finish()
    }
}

impl Validatable for SslConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(port) = self.port {
            validate_port_range(port, "port", self.domain_name())?;
        }

        if self.key_store_password.is_some() && self.key_store_path.is_none() {
            return Err(self.validation_error("keyStorePassword requires keyStorePath"));
        }

        if self.trust_store_password.is_some() && self.trust_store_path.is_none() {
            return Err(self.validation_error("trustStorePassword requires trustStorePath"));
        }

        if self.supported_protocols.is_empty() {
            return Err(self.validation_error("supportedProtocols cannot be empty"));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http.ssl"
    }
}

fn default_supported_protocols() -> Vec<String> {
    vec!["TLSv1.2".to_string(), "TLSv1.3".to_string()]
}
