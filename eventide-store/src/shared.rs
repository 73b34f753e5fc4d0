//! Thread-safe handle over a [`Repository`].
//!
//! One mutex guards the event log and the cached projection together, so an
//! event is either applied and recorded or neither, whichever thread adds it.
//! Readers of the latest state only hold the lock long enough to clone the
//! snapshot `Arc`; historical readers copy the log prefix under the lock and
//! replay it after releasing.

use crate::{Projection, Repository, StoreError, StoreResult, replay};
use eventide_model::ValidatedSchema;
use eventide_types::{EntityKey, Event, HybridTimestamp, Record, TimeSelector};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable, thread-safe repository handle.
#[derive(Debug, Clone)]
pub struct SharedRepository {
    inner: Arc<Mutex<Repository>>,
    /// Immutable after construction, so kept outside the lock.
    schema: Arc<ValidatedSchema>,
}

impl SharedRepository {
    pub fn new(repository: Repository) -> Self {
        let schema = Arc::new(repository.schema().clone());
        Self {
            inner: Arc::new(Mutex::new(repository)),
            schema,
        }
    }

    pub fn schema(&self) -> &ValidatedSchema {
        &self.schema
    }

    pub fn create(&self, entity: Record) -> StoreResult<HybridTimestamp> {
        self.lock()?.create(entity)
    }

    pub fn update(&self, partial: Record) -> StoreResult<HybridTimestamp> {
        self.lock()?.update(partial)
    }

    pub fn delete(&self, partial: Record) -> StoreResult<HybridTimestamp> {
        self.lock()?.delete(partial)
    }

    pub fn find_one(&self, partial: &Record, at: TimeSelector) -> StoreResult<Option<Record>> {
        let key = self
            .schema
            .key_of(partial)
            .ok_or_else(|| StoreError::MissingIdentifier {
                entity_type: self.schema.entity_type().to_string(),
                field: self.schema.identifier_field().to_string(),
            })?;
        self.find_by_key(&key, at)
    }

    pub fn find_by_key(&self, key: &EntityKey, at: TimeSelector) -> StoreResult<Option<Record>> {
        Ok(self.find_all(at)?.get(key).cloned())
    }

    /// Returns the projection selected by `at` without holding the lock
    /// during a historical replay.
    pub fn find_all(&self, at: TimeSelector) -> StoreResult<Arc<Projection>> {
        match at {
            TimeSelector::Latest => self.lock()?.find_all(TimeSelector::Latest),
            TimeSelector::At(at) => {
                let prefix = self.lock()?.projector().events_until(&at);
                replay(&self.schema, &prefix).map(Arc::new)
            }
        }
    }

    /// Hands the event log to `sink` while holding the lock.
    pub fn persist_event_log<R>(&self, sink: impl FnOnce(&[Event]) -> R) -> StoreResult<R> {
        Ok(self.lock()?.persist_event_log(sink))
    }

    /// A copy of the event log, taken under the lock.
    pub fn event_log(&self) -> StoreResult<Vec<Event>> {
        self.persist_event_log(|events| events.to_vec())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Repository>> {
        self.inner
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl From<Repository> for SharedRepository {
    fn from(repository: Repository) -> Self {
        Self::new(repository)
    }
}
