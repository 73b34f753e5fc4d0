//! Open, schema-agnostic records.
//!
//! A [`Record`] is the payload of every event and the shape of every
//! projected entity: a mapping from field name to JSON value. Unlike a plain
//! JSON object, a record can carry an explicit *absent* marker for a field.
//! Absent is not the same as `null`, `0`, `false` or `""`; those are all
//! present values and get copied like any other.

use crate::{EntityKey, Error, Result};
use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// A mapping from field name to value, where a value may be explicitly absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// `None` marks an explicitly absent field.
    fields: BTreeMap<String, Option<Value>>,
}

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder form of [`Record::unset`].
    #[must_use]
    pub fn with_absent(mut self, name: impl Into<String>) -> Self {
        self.unset(name);
        self
    }

    /// Sets a present value for a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), Some(value.into()));
    }

    /// Marks a field as explicitly absent.
    pub fn unset(&mut self, name: impl Into<String>) {
        self.fields.insert(name.into(), None);
    }

    /// Removes a field entirely, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name).flatten()
    }

    /// Returns the value of a field if it is present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    /// True if the field holds a present value (`null` counts as present).
    #[must_use]
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over present fields in name order.
    pub fn present_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    /// Number of present fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.present_fields().count()
    }

    /// True if the record has no present fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The entity key held in `field`, if the field is present and its value
    /// can identify an entity.
    #[must_use]
    pub fn key(&self, field: &str) -> Option<EntityKey> {
        self.get(field).and_then(EntityKey::from_value)
    }

    /// Copies every present field of `source` whose name is in `whitelist`
    /// onto this record, overwriting existing values.
    ///
    /// Absent fields in `source` never overwrite, and fields outside the
    /// whitelist are ignored. Returns the number of fields copied.
    pub fn merge_whitelisted(&mut self, source: &Record, whitelist: &BTreeSet<String>) -> usize {
        let mut copied = 0;
        for (name, value) in source.present_fields() {
            if whitelist.contains(name) {
                self.fields.insert(name.to_string(), Some(value.clone()));
                copied += 1;
            }
        }
        copied
    }

    /// Builds a fresh record holding only the whitelisted, present fields of `source`.
    #[must_use]
    pub fn whitelisted_copy(source: &Record, whitelist: &BTreeSet<String>) -> Self {
        let mut record = Self::new();
        record.merge_whitelisted(source, whitelist);
        record
    }

    /// Converts the present fields into a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.present_fields()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        )
    }

    /// Builds a record from any value that serializes to a JSON object.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        Self::try_from(serde_json::to_value(value)?)
    }

    /// Deserializes the present fields into a typed entity.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            fields: map.into_iter().map(|(k, v)| (k, Some(v))).collect(),
        }
    }
}

impl TryFrom<Value> for Record {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::from(map)),
            other => Err(Error::NotAnObject(json_kind(&other).to_string())),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.present_fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
