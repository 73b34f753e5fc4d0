use crate::SchemaError;
use eventide_types::{EntityKey, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declares an entity type's properties and which one identifies an entity.
///
/// Every declared property is whitelisted: it is eligible for copying from
/// event payloads onto entities. Exactly one property must be flagged as the
/// identifier; [`EntitySchema::validate`] enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub entity_type: String,
    pub properties: Vec<PropertyDescriptor>,
}

/// One declared property of an entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub is_id: bool,
}

impl PropertyDescriptor {
    /// A plain, whitelisted property.
    pub fn field(name: &str) -> Self {
        Self {
            name: name.into(),
            is_id: false,
        }
    }

    /// The identifier property.
    pub fn identifier(name: &str) -> Self {
        Self {
            name: name.into(),
            is_id: true,
        }
    }
}

impl EntitySchema {
    /// Starts an empty schema for `entity_type`.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            properties: Vec::new(),
        }
    }

    /// Declares the identifier property.
    #[must_use]
    pub fn with_identifier(mut self, name: &str) -> Self {
        self.properties.push(PropertyDescriptor::identifier(name));
        self
    }

    /// Declares a plain property.
    #[must_use]
    pub fn with_property(mut self, name: &str) -> Self {
        self.properties.push(PropertyDescriptor::field(name));
        self
    }

    /// Declares several plain properties.
    #[must_use]
    pub fn with_properties<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        self.properties
            .extend(names.into_iter().map(PropertyDescriptor::field));
        self
    }

    /// Checks the identifier constraint and resolves the descriptor.
    pub fn validate(&self) -> Result<ValidatedSchema, SchemaError> {
        let mut identifiers = self.properties.iter().filter(|p| p.is_id);
        let count = identifiers.clone().count();
        let identifier = match (identifiers.next(), count) {
            (Some(property), 1) => property,
            _ => {
                return Err(SchemaError::IdentifierCount {
                    entity_type: self.entity_type.clone(),
                    count,
                });
            }
        };

        Ok(ValidatedSchema {
            entity_type: self.entity_type.clone(),
            identifier_field: identifier.name.clone(),
            whitelisted_fields: self.properties.iter().map(|p| p.name.clone()).collect(),
        })
    }
}

/// A schema that passed validation: one identifier field plus the whitelist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSchema {
    entity_type: String,
    identifier_field: String,
    whitelisted_fields: BTreeSet<String>,
}

impl ValidatedSchema {
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn identifier_field(&self) -> &str {
        &self.identifier_field
    }

    pub fn whitelisted_fields(&self) -> &BTreeSet<String> {
        &self.whitelisted_fields
    }

    pub fn is_whitelisted(&self, field: &str) -> bool {
        self.whitelisted_fields.contains(field)
    }

    /// The entity key a record carries in the identifier field.
    pub fn key_of(&self, record: &Record) -> Option<EntityKey> {
        record.key(&self.identifier_field)
    }

    /// A record holding only the identifier field, set to `key`.
    ///
    /// Used by adapters that receive an identifier out of band (e.g. a URL
    /// path segment) and need a query or delete record.
    pub fn identifier_record(&self, key: &EntityKey) -> Record {
        Record::new().with(self.identifier_field.as_str(), key.to_value())
    }
}
