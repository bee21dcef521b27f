//! Utility functions and helpers for configuration

use serde::Serializer;
use std::time::Duration;

/// Serde helper module for Duration serialization as milliseconds
pub mod serde_millis {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(millis(duration))
    }
}

/// Serde helper module for optional Duration serialization
pub mod serde_millis_option {
    use super::*;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&millis(d)),
            None => serializer.serialize_none(),
        }
    }
}

fn millis(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Default functions
pub fn default_true() -> bool {
    true
}

pub fn default_false() -> bool {
    false
}

/// Store type used when a key or trust store does not name one
pub fn default_store_type() -> String {
    "JKS".to_string()
}
