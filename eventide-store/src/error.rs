//! Error types for the store layer.

use eventide_model::SchemaError;
use eventide_types::EntityKey;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entity type's descriptor is malformed. Fatal for that type.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// An event or query carries no usable value in the identifier field.
    #[error("missing identifier: {entity_type} record has no usable value in field {field:?}")]
    MissingIdentifier { entity_type: String, field: String },

    /// A create collided with an existing entity.
    #[error("duplicate identifier: {entity_type} {key} already exists")]
    DuplicateIdentifier { entity_type: String, key: EntityKey },

    /// An update or delete targeted an entity that does not exist.
    #[error("entity not found: {entity_type} {key}")]
    NotFound { entity_type: String, key: EntityKey },

    /// A point-in-time selector could not be parsed.
    #[error("invalid time selector: {0}")]
    InvalidTimeSelector(String),

    /// A record could not be built from, or converted into, a typed value.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A thread panicked while holding the repository lock.
    #[error("repository lock poisoned: {0}")]
    LockPoisoned(String),
}

impl StoreError {
    /// True for failures that abort only the current operation.
    ///
    /// Schema errors and poisoned locks leave the store unusable; every other
    /// error rejects one event or one query and the store carries on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Schema(_) | Self::LockPoisoned(_))
    }
}

impl From<eventide_types::Error> for StoreError {
    fn from(err: eventide_types::Error) -> Self {
        match err {
            eventide_types::Error::InvalidTimeSelector(raw) => Self::InvalidTimeSelector(raw),
            eventide_types::Error::Serialization(e) => Self::Serialization(e),
            other => Self::InvalidRecord(other.to_string()),
        }
    }
}
