//! HTTP session handling configuration

use crate::document::Section;
use crate::domains::utils::{default_false, default_true};
use crate::error::ConfigResult;
use crate::validation::{
    validate_absolute_path, validate_positive, validate_required_string, Validatable,
};
use serde::Serialize;
use std::time::Duration;

/// Session settings, read from `http.sessions`; stock settings when absent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionsConfig {
    /// Cookie path
    pub path: String,

    /// Cookie domain; host-only cookie when unset
    pub domain: Option<String>,

    pub cookie_name: String,

    /// Idle time after which a session is invalidated
    #[serde(serialize_with = "crate::domains::utils::serde_millis::serialize")]
    pub max_inactive_interval: Duration,

    pub secure_cookies: bool,

    pub http_only: bool,
}

impl SessionsConfig {
    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        Ok(Self {
            path: section.get("path", default_path())?,
            domain: section.get_opt("domain")?,
            cookie_name: section.get("cookieName", default_cookie_name())?,
            max_inactive_interval: section
                .get("maxInactiveInterval", default_max_inactive_interval())?,
            secure_cookies: section.get("secureCookies", default_false())?,
            http_only: section.get("httpOnly", default_true())?,
        })
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            domain: None,
            cookie_name: default_cookie_name(),
            max_inactive_interval: default_max_inactive_interval(),
            secure_cookies: false,
            http_only: true,
        }
    }
}

impl Validatable for SessionsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_absolute_path(&self.path, "path", self.domain_name())?;
        validate_required_string(&self.cookie_name, "cookieName", self.domain_name())?;
        validate_positive(
            self.max_inactive_interval.as_millis(),
            "maxInactiveInterval",
            self.domain_name(),
        )?;

        if let Some(domain) = &self.domain {
            validate_required_string(domain, "domain", self.domain_name())?;
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http.sessions"
    }
}

// Default value functions
fn default_path() -> String {
    "/".to_string()
}

fn default_cookie_name() -> String {
    "JSESSIONID".to_string()
}

fn default_max_inactive_interval() -> Duration {
    Duration::from_secs(30 * 60)
}
