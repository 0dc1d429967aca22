//! Traits for entities and the stores that persist them
//!
//! This module contains the contracts the repository engine is written against:
//! the entity model every persisted record carries and the store session it talks to.

pub mod entity;
pub mod store;

// Re-export all public items for convenience
pub use entity::{ActorId, AuditFields, Entity, Relation, RelationKind, AUDIT_COLUMNS};
pub use store::{EntityStore, StoreTransaction};
