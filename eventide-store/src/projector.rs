//! Projector - replays an event log into entity projections.
//!
//! Keeps a cached projection of the latest state, updated in place as events
//! are added, and rebuilds the state as of any past timestamp on demand by
//! replaying the log prefix. The log is assumed to be in non-decreasing
//! timestamp order; it is never re-sorted.

use crate::{Projection, StoreError, StoreResult};
use eventide_model::{EntitySchema, ValidatedSchema};
use eventide_types::{EntityKey, Event, EventPayload, HybridTimestamp, Record, TimeSelector};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Replays an event log and serves projections of it.
#[derive(Debug, Clone)]
pub struct Projector {
    schema: ValidatedSchema,
    log: Vec<Event>,
    /// Latest state. Shared with readers; copied on write while they hold it.
    cache: Arc<Projection>,
}

impl Projector {
    /// Validates the descriptor and replays `log` into the cached projection.
    ///
    /// An invalid descriptor fails with [`StoreError::Schema`]; an event in
    /// the seed log that cannot be applied fails construction as well.
    pub fn new(schema: &EntitySchema, log: Vec<Event>) -> StoreResult<Self> {
        Self::with_validated(schema.validate()?, log)
    }

    /// Builds a projector from an already validated descriptor.
    pub fn with_validated(schema: ValidatedSchema, log: Vec<Event>) -> StoreResult<Self> {
        let cache = replay(&schema, &log)?;
        info!(
            "Projector ready for {} ({} events, {} entities)",
            schema.entity_type(),
            log.len(),
            cache.len()
        );
        Ok(Self {
            schema,
            log,
            cache: Arc::new(cache),
        })
    }

    /// Returns the projection selected by `at`.
    ///
    /// `Latest` hands out the cached snapshot without recomputation. A
    /// timestamp replays every event stamped at or before it into a fresh
    /// projection, stopping at the first later event; the cache is untouched.
    pub fn project(&self, at: TimeSelector) -> StoreResult<Arc<Projection>> {
        match at {
            TimeSelector::Latest => Ok(Arc::clone(&self.cache)),
            TimeSelector::At(at) => replay_until(&self.schema, &self.log, &at).map(Arc::new),
        }
    }

    /// Applies `event` to the cache, then appends it to the log.
    ///
    /// A rejected event is neither recorded nor reflected in the cache. The
    /// event is checked against the shared snapshot first, so a rejection
    /// never copies the cache out from under its readers.
    pub fn add(&mut self, event: Event) -> StoreResult<()> {
        let (key, change) = match plan(&self.schema, &self.cache, &event) {
            Ok(planned) => planned,
            Err(e) => {
                warn!("Rejected {} event {}: {}", event.operation(), event.id, e);
                return Err(e);
            }
        };
        commit(&self.schema, Arc::make_mut(&mut self.cache), &event, key, change);
        self.log.push(event);
        Ok(())
    }

    /// The events stamped at or before `at`, in log order, up to the first later event.
    pub fn events_until(&self, at: &HybridTimestamp) -> Vec<Event> {
        self.log
            .iter()
            .take_while(|event| event.timestamp <= *at)
            .cloned()
            .collect()
    }

    pub fn event_log(&self) -> &[Event] {
        &self.log
    }

    pub fn schema(&self) -> &ValidatedSchema {
        &self.schema
    }

    /// Number of events in the log.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Timestamp of the most recently appended event.
    pub fn last_timestamp(&self) -> Option<HybridTimestamp> {
        self.log.last().map(|event| event.timestamp)
    }
}

/// Replays `events` in order onto an empty projection.
pub fn replay(schema: &ValidatedSchema, events: &[Event]) -> StoreResult<Projection> {
    let mut projection = Projection::new();
    for event in events {
        apply(schema, &mut projection, event)?;
    }
    Ok(projection)
}

/// Replays the prefix of `events` stamped at or before `at`.
///
/// Stops at the first event stamped after `at`, so an unsorted log yields the
/// state after that prefix of the given order.
pub fn replay_until(
    schema: &ValidatedSchema,
    events: &[Event],
    at: &HybridTimestamp,
) -> StoreResult<Projection> {
    let mut projection = Projection::new();
    for event in events.iter().take_while(|event| event.timestamp <= *at) {
        apply(schema, &mut projection, event)?;
    }
    Ok(projection)
}

/// Applies a single event to `projection`.
///
/// Every check runs before the projection is touched, so a failed apply
/// leaves it exactly as it was.
pub fn apply(
    schema: &ValidatedSchema,
    projection: &mut Projection,
    event: &Event,
) -> StoreResult<()> {
    let (key, change) = plan(schema, projection, event)?;
    commit(schema, projection, event, key, change);
    Ok(())
}

/// The effect of one accepted event on a projection.
enum Change<'e> {
    Insert(&'e Record),
    Merge(usize, &'e Record),
    Remove(usize),
}

/// Checks `event` against `projection` without modifying it.
fn plan<'e>(
    schema: &ValidatedSchema,
    projection: &Projection,
    event: &'e Event,
) -> StoreResult<(EntityKey, Change<'e>)> {
    let key = schema
        .key_of(event.data())
        .ok_or_else(|| StoreError::MissingIdentifier {
            entity_type: schema.entity_type().to_string(),
            field: schema.identifier_field().to_string(),
        })?;

    let change = match (&event.payload, projection.position(&key)) {
        (EventPayload::Create(_), Some(_)) => {
            return Err(StoreError::DuplicateIdentifier {
                entity_type: schema.entity_type().to_string(),
                key,
            });
        }
        (EventPayload::Update(_) | EventPayload::Delete(_), None) => {
            return Err(StoreError::NotFound {
                entity_type: schema.entity_type().to_string(),
                key,
            });
        }
        (EventPayload::Create(data), None) => Change::Insert(data),
        (EventPayload::Update(data), Some(index)) => Change::Merge(index, data),
        (EventPayload::Delete(_), Some(index)) => Change::Remove(index),
    };
    Ok((key, change))
}

fn commit(
    schema: &ValidatedSchema,
    projection: &mut Projection,
    event: &Event,
    key: EntityKey,
    change: Change<'_>,
) {
    debug!(
        "Applied {} to {} {} at {}",
        event.operation(),
        schema.entity_type(),
        key,
        event.timestamp
    );
    match change {
        Change::Insert(data) => {
            projection.push(key, Record::whitelisted_copy(data, schema.whitelisted_fields()));
        }
        Change::Merge(index, data) => {
            if let Some(entity) = projection.entity_mut(index) {
                entity.merge_whitelisted(data, schema.whitelisted_fields());
            }
        }
        Change::Remove(index) => {
            projection.remove(index);
        }
    }
}
