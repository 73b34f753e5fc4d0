//! Core type definitions for Eventide.
//!
//! This crate defines the schema-agnostic types shared by every layer:
//! - Event identifiers (UUID v7) and normalized entity keys
//! - Hybrid Logical Clock timestamps and point-in-time selectors
//! - Open records with an explicit absent marker
//! - Create/Update/Delete events
//!
//! Nothing here knows which fields an entity type declares; that lives in
//! `eventide-model`.

mod event;
mod ids;
mod record;
mod selector;
mod timestamp;

pub use event::{Event, EventId, EventPayload, Operation};
pub use ids::EntityKey;
pub use record::Record;
pub use selector::TimeSelector;
pub use timestamp::HybridTimestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("expected a JSON object for a record, got {0}")]
    NotAnObject(String),

    #[error("invalid time selector {0:?}: expected \"latest\", <millis>, <millis>:<logical> or an RFC 3339 instant")]
    InvalidTimeSelector(String),
}
