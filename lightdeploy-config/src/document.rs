//! Untyped configuration documents and the typed accessor over them
//!
//! A document is whatever an external loader produced: a tree of scalars,
//! lists and string-keyed maps. Section builders never look at the tree
//! directly; they go through [`Section`], which turns every lookup into a
//! [`ConfigResult`] carrying the full dotted key on failure.

use crate::error::{ConfigError, ConfigResult};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// String-keyed mapping node
pub type ConfigMap = BTreeMap<String, ConfigValue>;

static EMPTY_MAP: ConfigMap = BTreeMap::new();

/// A node of an untyped configuration document
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(ConfigMap),
}

impl ConfigValue {
    /// Human readable name of the node kind, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Int(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Parse a scalar the way a YAML loader would for a plain string:
    /// booleans and integers are recognised, everything else stays text.
    pub fn from_env_str(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            ConfigValue::Bool(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            ConfigValue::Bool(false)
        } else if let Ok(n) = trimmed.parse::<i64>() {
            ConfigValue::Int(n)
        } else {
            ConfigValue::String(raw.to_string())
        }
    }

    /// Set a nested value, creating intermediate mappings as needed.
    ///
    /// Null nodes on the way (including `self`) become mappings; any other
    /// non-mapping node is an `InvalidType` error at its dotted path.
    pub fn set_path(&mut self, path: &[&str], value: ConfigValue) -> ConfigResult<()> {
        let Some((last, parents)) = path.split_last() else {
            *self = value;
            return Ok(());
        };

        let mut node = self;
        for (depth, segment) in parents.iter().enumerate() {
            node = node
                .map_mut(&path[..depth])?
                .entry((*segment).to_string())
                .or_insert(ConfigValue::Null);
        }
        node.map_mut(parents)?.insert((*last).to_string(), value);
        Ok(())
    }

    fn map_mut(&mut self, path: &[&str]) -> ConfigResult<&mut ConfigMap> {
        if self.is_null() {
            *self = ConfigValue::Map(ConfigMap::new());
        }
        match self {
            ConfigValue::Map(map) => Ok(map),
            other => Err(invalid_type(display_path(&path.join(".")), "mapping", other)),
        }
    }
}

impl From<ConfigMap> for ConfigValue {
    fn from(map: ConfigMap) -> Self {
        ConfigValue::Map(map)
    }
}

impl TryFrom<serde_yaml::Value> for ConfigValue {
    type Error = ConfigError;

    fn try_from(value: serde_yaml::Value) -> ConfigResult<Self> {
        from_yaml(value, "")
    }
}

fn from_yaml(value: serde_yaml::Value, path: &str) -> ConfigResult<ConfigValue> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => ConfigValue::Null,
        Yaml::Bool(b) => ConfigValue::Bool(b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => ConfigValue::Int(i),
            None => n.as_f64().map_or(ConfigValue::Null, ConfigValue::Float),
        },
        Yaml::String(s) => ConfigValue::String(s),
        Yaml::Sequence(items) => ConfigValue::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, item)| from_yaml(item, &format!("{}[{}]", display_path(path), i)))
                .collect::<ConfigResult<_>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut map = ConfigMap::new();
            for (key, item) in mapping {
                let key = match key {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(ConfigError::InvalidValue {
                            key: display_path(path).to_string(),
                            message: format!(
                                "mapping keys must be scalars, found {}",
                                yaml_kind(&other)
                            ),
                        })
                    }
                };
                let child_path = join_key(path, &key);
                map.insert(key, from_yaml(item, &child_path)?);
            }
            ConfigValue::Map(map)
        }
        Yaml::Tagged(tagged) => {
            return Err(ConfigError::InvalidValue {
                key: display_path(path).to_string(),
                message: format!("YAML tag {} is not supported", tagged.tag),
            })
        }
    })
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value as Yaml;
    match value {
        Yaml::Sequence(_) => "list",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged value",
        _ => "scalar",
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => ConfigValue::Null,
            Json::Bool(b) => ConfigValue::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => n.as_f64().map_or(ConfigValue::Null, ConfigValue::Float),
            },
            Json::String(s) => ConfigValue::String(s),
            Json::Array(items) => ConfigValue::List(items.into_iter().map(Into::into).collect()),
            Json::Object(object) => {
                ConfigValue::Map(object.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Conversion from a document node into a typed field value
pub trait FromConfigValue: Sized {
    /// Name of the expected kind, used in error messages
    const EXPECTED: &'static str;

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self>;
}

/// Error for a node of the wrong kind at `key`
pub fn invalid_type(key: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
    ConfigError::InvalidType {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

impl FromConfigValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
        match value {
            ConfigValue::Bool(b) => Ok(*b),
            other => Err(invalid_type(key, Self::EXPECTED, other)),
        }
    }
}

impl FromConfigValue for String {
    const EXPECTED: &'static str = "string";

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
        match value {
            ConfigValue::String(s) => Ok(s.clone()),
            other => Err(invalid_type(key, Self::EXPECTED, other)),
        }
    }
}

impl FromConfigValue for PathBuf {
    const EXPECTED: &'static str = "path string";

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
        match value {
            ConfigValue::String(s) => Ok(PathBuf::from(s)),
            other => Err(invalid_type(key, Self::EXPECTED, other)),
        }
    }
}

macro_rules! impl_from_config_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                const EXPECTED: &'static str = "integer";

                fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
                    match value {
                        ConfigValue::Int(n) => <$ty>::try_from(*n).map_err(|_| {
                            ConfigError::InvalidValue {
                                key: key.to_string(),
                                message: format!(
                                    "{} is out of range ({}..={})",
                                    n,
                                    <$ty>::MIN,
                                    <$ty>::MAX
                                ),
                            }
                        }),
                        other => Err(invalid_type(key, Self::EXPECTED, other)),
                    }
                }
            }
        )*
    };
}

impl_from_config_integer!(i32, i64, u16, u32, u64, usize);

/// Durations are written as whole milliseconds
impl FromConfigValue for Duration {
    const EXPECTED: &'static str = "integer (milliseconds)";

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
        match value {
            ConfigValue::Int(_) => u64::from_config_value(value, key).map(Duration::from_millis),
            other => Err(invalid_type(key, Self::EXPECTED, other)),
        }
    }
}

impl FromConfigValue for Vec<String> {
    const EXPECTED: &'static str = "list of strings";

    fn from_config_value(value: &ConfigValue, key: &str) -> ConfigResult<Self> {
        match value {
            ConfigValue::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| String::from_config_value(item, &format!("{}[{}]", key, i)))
                .collect(),
            other => Err(invalid_type(key, Self::EXPECTED, other)),
        }
    }
}

/// Borrowed view of one mapping in a document, with its dotted location
#[derive(Debug, Clone)]
pub struct Section<'a> {
    map: &'a ConfigMap,
    path: String,
}

impl<'a> Section<'a> {
    /// View the document root; it must be a mapping
    pub fn root(document: &'a ConfigValue) -> ConfigResult<Self> {
        match document {
            ConfigValue::Map(map) => Ok(Self {
                map,
                path: String::new(),
            }),
            other => Err(invalid_type("<root>", "mapping", other)),
        }
    }

    /// Dotted location of this section in the document
    pub fn path(&self) -> &str {
        display_path(&self.path)
    }

    /// Full dotted name of `key` inside this section
    pub fn qualify(&self, key: &str) -> String {
        join_key(&self.path, key)
    }

    fn value(&self, key: &str) -> Option<&'a ConfigValue> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    /// Value at `key`, or `default` when it is absent or null
    pub fn get<T: FromConfigValue>(&self, key: &str, default: T) -> ConfigResult<T> {
        Ok(self.get_opt(key)?.unwrap_or(default))
    }

    pub fn get_opt<T: FromConfigValue>(&self, key: &str) -> ConfigResult<Option<T>> {
        self.value(key)
            .map(|v| T::from_config_value(v, &self.qualify(key)))
            .transpose()
    }

    pub fn require<T: FromConfigValue>(&self, key: &str) -> ConfigResult<T> {
        self.get_opt(key)?.ok_or_else(|| ConfigError::MissingField {
            key: self.qualify(key),
        })
    }

    /// Nested mapping at `key`.
    ///
    /// A key declared with a null value yields an empty section: `ssl:` with
    /// no body still switches the section on.
    pub fn child(&self, key: &str) -> ConfigResult<Option<Section<'a>>> {
        let map = match self.map.get(key) {
            None => return Ok(None),
            Some(ConfigValue::Null) => &EMPTY_MAP,
            Some(ConfigValue::Map(map)) => map,
            Some(other) => return Err(invalid_type(&self.qualify(key), "mapping", other)),
        };
        Ok(Some(Section {
            map,
            path: self.qualify(key),
        }))
    }

    /// Entries of this section, in key order
    pub fn entries(&self) -> impl Iterator<Item = (&'a str, &'a ConfigValue)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
