//! Entity Store - repository engine over relational stores
//!
//! This crate provides the entity model, the store contract with its Postgres and
//! in-memory backends, the query builder both of them consume, and the generic
//! [`Repository`] that layers soft-delete, auditing, paging, aggregates and
//! cached reads on top.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod backends;
pub mod errors;
pub mod prelude;
pub mod query_builder;
pub mod repository;
pub mod traits;
pub mod validation;

pub use backends::{MemoryStore, MemoryTransaction, PgStore, PgStoreTransaction};
pub use cache_system::{CacheManager, CacheParams};
pub use errors::RepositoryError;
pub use query_builder::{
    AggregateFunction, Includes, OrderBy, PagedResult, QueryBuilder, QueryFilter, QueryOperator,
    SortOrder,
};
pub use repository::{EntityQuery, Repository};
pub use traits::*;
pub use validation::{ValidatedFieldName, ValidatedTableName, ValidationError};

use sqlx::PgPool;

pub type DbPool = PgPool;

/// Result alias used throughout the repository engine
pub type Result<T, E = RepositoryError> = std::result::Result<T, E>;
