//! Repository engine
//!
//! [`Repository`] is generic over an [`Entity`](crate::traits::Entity) and the
//! [`EntityStore`](crate::traits::EntityStore) that persists it. Reads go through
//! lazy [`EntityQuery`] values; writes run inside a transaction scope.

mod bulk;
mod cached;
mod core;
mod crud;
mod inspection;
mod lifecycle;
mod query;
mod transaction;

pub use self::core::Repository;
pub use self::query::EntityQuery;
