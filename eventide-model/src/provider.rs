use crate::{EntitySchema, SchemaError, ValidatedSchema};
use std::collections::HashMap;

/// Supplies the descriptor for an entity type.
///
/// The store asks a provider once, at construction, and never inspects
/// entity values to infer a schema.
pub trait SchemaProvider {
    fn schema_for(&self, entity_type: &str) -> Option<&EntitySchema>;

    /// Looks up and validates the descriptor for `entity_type`.
    fn resolve(&self, entity_type: &str) -> Result<ValidatedSchema, SchemaError> {
        self.schema_for(entity_type)
            .ok_or_else(|| SchemaError::UnknownType(entity_type.to_string()))?
            .validate()
    }
}

/// Implemented by statically typed entities that declare their own schema.
///
/// ```
/// use eventide_model::{DescribedEntity, EntitySchema};
///
/// struct Book;
///
/// impl DescribedEntity for Book {
///     fn schema() -> EntitySchema {
///         EntitySchema::new("book")
///             .with_identifier("uuid")
///             .with_properties(["title", "pages"])
///     }
/// }
///
/// assert_eq!(Book::schema().validate().unwrap().identifier_field(), "uuid");
/// ```
pub trait DescribedEntity {
    fn schema() -> EntitySchema;
}

/// Lookup table of descriptors keyed by entity type.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, EntitySchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor, returning the one it replaced.
    pub fn register(&mut self, schema: EntitySchema) -> Option<EntitySchema> {
        self.schemas.insert(schema.entity_type.clone(), schema)
    }

    /// Registers the descriptor of a typed entity.
    pub fn register_entity<T: DescribedEntity>(&mut self) -> Option<EntitySchema> {
        self.register(T::schema())
    }

    /// Registered entity types, sorted.
    pub fn entity_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl SchemaProvider for SchemaRegistry {
    fn schema_for(&self, entity_type: &str) -> Option<&EntitySchema> {
        self.schemas.get(entity_type)
    }
}

impl FromIterator<EntitySchema> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = EntitySchema>>(iter: I) -> Self {
        let mut registry = Self::new();
        for schema in iter {
            registry.register(schema);
        }
        registry
    }
}
