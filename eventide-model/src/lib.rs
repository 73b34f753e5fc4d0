//! Schema descriptor contract for Eventide.
//!
//! Defines how a store learns the shape of an entity type:
//! - [`EntitySchema`] declares the properties of a type and flags the identifier
//! - [`ValidatedSchema`] is the resolved form: one identifier field plus the whitelist
//! - [`SchemaProvider`] / [`SchemaRegistry`] look descriptors up by entity type
//! - [`DescribedEntity`] lets typed structs carry their own descriptor
//!
//! Schemas are explicit values handed to the store at construction; nothing
//! here inspects entity data.

mod error;
mod provider;
mod schema;

pub use error::SchemaError;
pub use provider::{DescribedEntity, SchemaProvider, SchemaRegistry};
pub use schema::{EntitySchema, PropertyDescriptor, ValidatedSchema};
