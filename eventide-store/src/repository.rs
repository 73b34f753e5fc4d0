//! CRUD facade over a [`Projector`].
//!
//! Every mutation becomes exactly one event stamped by the repository's
//! hybrid clock; every query reads a projection.

use crate::{Projection, Projector, StoreError, StoreResult};
use eventide_model::{DescribedEntity, EntitySchema, SchemaProvider, ValidatedSchema};
use eventide_types::{EntityKey, Event, EventPayload, HybridTimestamp, Record, TimeSelector};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Owns one projector and stamps the events it emits.
#[derive(Debug, Clone)]
pub struct Repository {
    projector: Projector,
    /// Last timestamp handed out (or seen in the seed log).
    clock: HybridTimestamp,
}

impl Repository {
    /// Creates a repository for `schema`, replaying `seed` first.
    pub fn new(schema: &EntitySchema, seed: Vec<Event>) -> StoreResult<Self> {
        Ok(Self::from_projector(Projector::new(schema, seed)?))
    }

    /// Creates a repository for `entity_type` as described by `provider`.
    pub fn from_provider<P: SchemaProvider + ?Sized>(
        provider: &P,
        entity_type: &str,
        seed: Vec<Event>,
    ) -> StoreResult<Self> {
        let schema = provider.resolve(entity_type)?;
        Ok(Self::from_projector(Projector::with_validated(schema, seed)?))
    }

    /// Creates a repository for a typed entity that declares its own schema.
    pub fn for_entity<T: DescribedEntity>(seed: Vec<Event>) -> StoreResult<Self> {
        Self::new(&T::schema(), seed)
    }

    fn from_projector(projector: Projector) -> Self {
        let clock = projector
            .event_log()
            .iter()
            .map(|event| event.timestamp)
            .max()
            .unwrap_or(HybridTimestamp::new(0, 0));
        Self { projector, clock }
    }

    /// Records the creation of a full entity. Returns the event's timestamp.
    pub fn create(&mut self, entity: Record) -> StoreResult<HybridTimestamp> {
        let timestamp = self.append(EventPayload::Create(entity))?;
        debug!("Created {} at {}", self.schema().entity_type(), timestamp);
        Ok(timestamp)
    }

    /// Records a partial update. The identifier field must be set.
    pub fn update(&mut self, partial: Record) -> StoreResult<HybridTimestamp> {
        let timestamp = self.append(EventPayload::Update(partial))?;
        debug!("Updated {} at {}", self.schema().entity_type(), timestamp);
        Ok(timestamp)
    }

    /// Records a deletion. Only the identifier field is consulted.
    pub fn delete(&mut self, partial: Record) -> StoreResult<HybridTimestamp> {
        let timestamp = self.append(EventPayload::Delete(partial))?;
        debug!("Deleted {} at {}", self.schema().entity_type(), timestamp);
        Ok(timestamp)
    }

    /// Finds the entity whose identifier matches `partial`'s.
    ///
    /// Returns `Ok(None)` when no entity matches; a query record without an
    /// identifier value fails with [`StoreError::MissingIdentifier`].
    pub fn find_one(&self, partial: &Record, at: TimeSelector) -> StoreResult<Option<Record>> {
        let key = self.key_of(partial)?;
        Ok(self.projector.project(at)?.get(&key).cloned())
    }

    /// Finds the entity with the given key.
    pub fn find_by_key(&self, key: &EntityKey, at: TimeSelector) -> StoreResult<Option<Record>> {
        Ok(self.projector.project(at)?.get(key).cloned())
    }

    /// Returns every entity as of `at`.
    pub fn find_all(&self, at: TimeSelector) -> StoreResult<Arc<Projection>> {
        self.projector.project(at)
    }

    /// Hands the raw event log to `sink` and returns its result.
    pub fn persist_event_log<R>(&self, sink: impl FnOnce(&[Event]) -> R) -> R {
        sink(self.projector.event_log())
    }

    /// [`Repository::create`] for a typed entity.
    pub fn create_typed<T: Serialize>(&mut self, entity: &T) -> StoreResult<HybridTimestamp> {
        self.create(Record::from_serialize(entity)?)
    }

    /// [`Repository::update`] for any value that serializes to a partial record.
    pub fn update_typed<T: Serialize>(&mut self, partial: &T) -> StoreResult<HybridTimestamp> {
        self.update(Record::from_serialize(partial)?)
    }

    /// [`Repository::find_one`], deserialized into `T`.
    pub fn find_one_as<T: DeserializeOwned>(
        &self,
        partial: &Record,
        at: TimeSelector,
    ) -> StoreResult<Option<T>> {
        match self.find_one(partial, at)? {
            Some(record) => Ok(Some(record.to_typed()?)),
            None => Ok(None),
        }
    }

    /// [`Repository::find_all`], deserialized into `T`.
    pub fn find_all_as<T: DeserializeOwned>(&self, at: TimeSelector) -> StoreResult<Vec<T>> {
        self.find_all(at)?
            .iter()
            .map(|record| record.to_typed().map_err(StoreError::from))
            .collect()
    }

    pub fn schema(&self) -> &ValidatedSchema {
        self.projector.schema()
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn event_log(&self) -> &[Event] {
        self.projector.event_log()
    }

    fn key_of(&self, partial: &Record) -> StoreResult<EntityKey> {
        let schema = self.schema();
        schema.key_of(partial).ok_or_else(|| StoreError::MissingIdentifier {
            entity_type: schema.entity_type().to_string(),
            field: schema.identifier_field().to_string(),
        })
    }

    /// Stamps and adds one event. The clock only moves when the event is accepted.
    fn append(&mut self, payload: EventPayload) -> StoreResult<HybridTimestamp> {
        let timestamp = self.clock.tick();
        self.projector.add(Event::new(timestamp, payload))?;
        self.clock = timestamp;
        Ok(timestamp)
    }
}
