//! Event-sourced entity store for Eventide.
//!
//! An append-only log of Create/Update/Delete events is replayed into a
//! materialized collection of current entities, and can be replayed again up
//! to any past instant.
//!
//! # Architecture
//!
//! - [`Projector`] owns the log and a cached latest [`Projection`]; each added
//!   event is applied to the cache before it is recorded
//! - [`Repository`] is the CRUD facade: one stamped event per mutation
//! - [`SharedRepository`] guards a repository for multi-threaded hosts
//! - [`replay`], [`replay_until`] and [`apply`] are the pure replay steps
//!
//! Projections are handed out as `Arc` snapshots. A snapshot never changes
//! after it is handed out; later writes copy the cache instead.

mod error;
mod projection;
mod projector;
mod repository;
mod shared;

pub use error::{StoreError, StoreResult};
pub use projection::Projection;
pub use projector::{Projector, apply, replay, replay_until};
pub use repository::Repository;
pub use shared::SharedRepository;
