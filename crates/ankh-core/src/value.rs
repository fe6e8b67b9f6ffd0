//! Dynamic configuration values with deep merge support
//!
//! Descriptors and the global config carry free-form YAML blocks
//! (`default_values`, `global`, ...). They are kept as an explicit [`Value`]
//! tree instead of an open dynamic type so every consumer matches on the
//! same six cases.

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

use crate::error::{CoreError, Result};

/// Ordered string-keyed mapping, declaration order preserved
pub type Mapping = IndexMap<String, Value>;

/// A parsed configuration value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
}

/// Numeric scalar as it appeared in the source document
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{n}"),
            Number::UInt(n) => write!(f, "{n}"),
            // shortest round-trippable form, never exponent notation
            Number::Float(n) => write!(f, "{n}"),
        }
    }
}

impl From<&serde_yaml::Number> for Number {
    fn from(n: &serde_yaml::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Int(i)
        } else if let Some(u) = n.as_u64() {
            Number::UInt(u)
        } else {
            Number::Float(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl Value {
    /// Create an empty mapping
    pub fn mapping() -> Self {
        Value::Mapping(Mapping::new())
    }

    /// Parse a value from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Serialize back to a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get a value by dotted path (e.g. `image.tag`)
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(self, |current, key| match current {
            Value::Mapping(map) => map.get(key),
            _ => None,
        })
    }

    /// Set a value by dotted path, creating intermediate mappings
    pub fn set(&mut self, path: &str, value: Value) {
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(self, &parts, value);
    }

    /// Deep merge another value into this one
    ///
    /// Rules:
    /// - Mappings: recursive merge
    /// - Everything else (sequences included): overlay replaces base
    pub fn merge(&mut self, overlay: &Value) {
        match (self, overlay) {
            (Value::Mapping(base), Value::Mapping(overlay)) => {
                for (key, overlay_value) in overlay {
                    match base.get_mut(key) {
                        Some(base_value) => base_value.merge(overlay_value),
                        None => {
                            base.insert(key.clone(), overlay_value.clone());
                        }
                    }
                }
            }
            (base, overlay) => *base = overlay.clone(),
        }
    }

    /// Interpret a `--set` right-hand side the way helm does
    ///
    /// Only booleans, `null` and integers without a leading zero are typed;
    /// everything else, decimals included, stays a verbatim string.
    pub fn parse_scalar(raw: &str) -> Value {
        if raw.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if raw.eq_ignore_ascii_case("null") {
            return Value::Null;
        }

        let leading_zero = raw.len() > 1 && raw.starts_with('0');
        match raw.parse::<i64>() {
            Ok(n) if !leading_zero => Value::Number(Number::Int(n)),
            _ => Value::String(raw.to_string()),
        }
    }
}

fn set_nested(value: &mut Value, path: &[&str], new_value: Value) {
    let Some((key, remaining)) = path.split_first() else {
        *value = new_value;
        return;
    };

    if !matches!(value, Value::Mapping(_)) {
        *value = Value::mapping();
    }

    if let Value::Mapping(map) = value {
        let entry = map.entry(key.to_string()).or_insert(Value::Null);
        set_nested(entry, remaining, new_value);
    }
}

/// Parse `key=value` settings into a nested value
pub fn parse_set_values(settings: &[String]) -> Result<Value> {
    let mut values = Value::mapping();

    for setting in settings {
        let (key, raw) = setting
            .split_once('=')
            .ok_or_else(|| CoreError::InvalidSetting {
                setting: setting.clone(),
            })?;
        values.set(key, Value::parse_scalar(raw));
    }

    Ok(values)
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(n.into()))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(Number::Float(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Mapping> for Value {
    fn from(map: Mapping) -> Self {
        Value::Mapping(map)
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = String;

    fn try_from(raw: serde_yaml::Value) -> std::result::Result<Self, Self::Error> {
        use serde_yaml::Value as Yaml;

        Ok(match raw {
            Yaml::Null => Value::Null,
            Yaml::Bool(b) => Value::Bool(b),
            Yaml::Number(n) => Value::Number(Number::from(&n)),
            Yaml::String(s) => Value::String(s),
            Yaml::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<std::result::Result<_, _>>()?,
            ),
            Yaml::Mapping(entries) => {
                let mut map = Mapping::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(mapping_key(key)?, Value::try_from(value)?);
                }
                Value::Mapping(map)
            }
            Yaml::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

/// YAML allows any scalar as a key; overlays only ever address string keys
fn mapping_key(key: serde_yaml::Value) -> std::result::Result<String, String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Null => Ok("null".to_string()),
        other => Err(format!("unsupported mapping key: {other:?}")),
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_yaml::Value::deserialize(deserializer)?;
        Value::try_from(raw).map_err(de::Error::custom)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(n)) => serializer.serialize_i64(*n),
            Value::Number(Number::UInt(n)) => serializer.serialize_u64(*n),
            Value::Number(Number::Float(n)) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}
