//! Response compression configuration

use crate::document::Section;
use crate::domains::utils::default_true;
use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::Serialize;

/// Gzip settings, read from `http.gzip`; enabled with stock settings when absent
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GzipConfig {
    pub enabled: bool,

    /// Responses smaller than this many bytes are sent uncompressed
    pub minimum_entity_size: u32,

    /// Deflater buffer size in bytes
    pub buffer_size: u32,

    pub excluded_user_agents: Vec<String>,

    /// Mime types to compress; empty means the engine's default set
    pub compressed_mime_types: Vec<String>,
}

impl GzipConfig {
    pub fn from_section(section: &Section<'_>) -> ConfigResult<Self> {
        Ok(Self {
            enabled: section.get("enabled", default_true())?,
            minimum_entity_size: section.get("minimumEntitySize", default_minimum_entity_size())?,
            buffer_size: section.get("bufferSize", default_buffer_size())?,
            excluded_user_agents: section.get("excludedUserAgents", Vec::new())?,
            compressed_mime_types: section.get("compressedMimeTypes", Vec::new())?,
        })
    }
}

impl Default for GzipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            minimum_entity_size: default_minimum_entity_size(),
            buffer_size: default_buffer_size(),
            excluded_user_agents: Vec::new(),
            compressed_mime_types: Vec::new(),
        }
    }
}

impl Validatable for GzipConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.enabled {
            validate_positive(self.buffer_size, "bufferSize", self.domain_name())?;
        }

        if self.compressed_mime_types.iter().any(|m| !m.contains('/')) {
            return Err(self.validation_error(
                "compressedMimeTypes entries must look like 'type/subtype'",
            ));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http.gzip"
    }
}

// Default value functions
fn default_minimum_entity_size() -> u32 {
    256
}

fn default_buffer_size() -> u32 {
    8 * 1024
}
