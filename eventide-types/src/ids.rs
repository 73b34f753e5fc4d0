//! Identifier types used throughout the Eventide core.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt;

/// Comparable form of an entity's identifier value.
///
/// Entities are matched by key equality, never by object identity. Equality
/// is typed: the string `"42"` and the number `42` are different keys, as are
/// `true` and `"true"`. Any present JSON scalar can identify an entity,
/// including `null` and booleans. Arrays and objects cannot.
///
/// Numbers compare by their JSON text, so `42` and `42.0` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Null,
    Bool(bool),
    /// A JSON number, held as its canonical text.
    Number(String),
    String(String),
}

impl EntityKey {
    /// A string key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self::String(key.into())
    }

    /// Derives the key of an identifier value, if the value is a scalar.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => Some(Self::Number(n.to_string())),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The identifier value this key was derived from.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(text) => text
                .parse::<Number>()
                .map_or_else(|_| Value::String(text.clone()), Value::Number),
            Self::String(s) => Value::String(s.clone()),
        }
    }

    /// The key's text if it is a string key.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(text) => f.write_str(text),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for EntityKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for EntityKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| D::Error::custom("an entity key must be a JSON scalar"))
    }
}
