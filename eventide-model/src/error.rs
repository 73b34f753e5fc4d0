//! Error types for schema resolution.

use thiserror::Error;

/// Errors raised while resolving a schema descriptor.
///
/// These are construction-time failures: a store refuses to start for an
/// entity type whose descriptor does not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The descriptor does not declare exactly one identifier property.
    #[error("entity type {entity_type:?} must declare exactly one identifier property, found {count}")]
    IdentifierCount { entity_type: String, count: usize },

    /// No descriptor is registered for the entity type.
    #[error("no schema registered for entity type {0:?}")]
    UnknownType(String),
}
