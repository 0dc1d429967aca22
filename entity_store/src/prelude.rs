//! Convenience re-exports for common entity-store usage

// Core traits
pub use crate::traits::{
    ActorId, AuditFields, Entity, EntityStore, Relation, RelationKind, StoreTransaction,
};

// Error types
pub use crate::errors::RepositoryError;

// Repository engine and backends
pub use crate::backends::{MemoryStore, PgStore};
pub use crate::repository::{EntityQuery, Repository};

// Query building
pub use crate::query_builder::{
    Includes, OrderBy, PagedResult, QueryBuilder, QueryFilter, SortOrder,
};

// Validation
pub use crate::validation::{ValidatedFieldName, ValidationError};

// Cache params (re-exported from cache_system)
pub use crate::{CacheManager, CacheParams};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use serde_json::json;
pub use sqlx::{FromRow, PgPool};
pub use uuid::Uuid;
