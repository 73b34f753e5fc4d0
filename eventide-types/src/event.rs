//! Event types for the append-only entity log.
//!
//! Each event records one Create, Update or Delete against one entity and is
//! immutable once appended. The engine only understands these three
//! operations; the record payload is schema-agnostic.

use crate::{HybridTimestamp, Record};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The CRUD operation an event performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        })
    }
}

/// The payload of an event, containing the operation and its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    /// An entity was created. Carries the full entity.
    Create(Record),

    /// An entity was updated. Carries a partial entity; the identifier is required.
    Update(Record),

    /// An entity was deleted. Only the identifier field is consulted.
    Delete(Record),
}

impl EventPayload {
    /// The operation this payload performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Create(_) => Operation::Create,
            Self::Update(_) => Operation::Update,
            Self::Delete(_) => Operation::Delete,
        }
    }

    /// The record carried by the payload.
    #[must_use]
    pub const fn data(&self) -> &Record {
        match self {
            Self::Create(data) | Self::Update(data) | Self::Delete(data) => data,
        }
    }
}

/// An immutable, timestamped change to one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    pub id: EventId,

    /// When this event occurred.
    pub timestamp: HybridTimestamp,

    /// The operation to perform.
    pub payload: EventPayload,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(timestamp: HybridTimestamp, payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp,
            payload,
        }
    }

    /// Creates a create event.
    #[must_use]
    pub fn create(timestamp: HybridTimestamp, data: Record) -> Self {
        Self::new(timestamp, EventPayload::Create(data))
    }

    /// Creates an update event.
    #[must_use]
    pub fn update(timestamp: HybridTimestamp, data: Record) -> Self {
        Self::new(timestamp, EventPayload::Update(data))
    }

    /// Creates a delete event.
    #[must_use]
    pub fn delete(timestamp: HybridTimestamp, data: Record) -> Self {
        Self::new(timestamp, EventPayload::Delete(data))
    }

    /// The operation this event performs.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.payload.operation()
    }

    /// The record carried by this event.
    #[must_use]
    pub const fn data(&self) -> &Record {
        self.payload.data()
    }
}
