//! Store session contract
//!
//! A store executes composed queries for one entity type at a time and hands out
//! transaction scopes for writes. The repository never interprets filters itself;
//! it only composes them into a [`QueryBuilder`] and passes that to the store.

use super::entity::Entity;
use crate::errors::RepositoryError;
use crate::query_builder::{AggregateFunction, QueryBuilder};
use crate::validation::ValidatedFieldName;
use async_trait::async_trait;
use serde_json::Value;

/// Underlying relational session
#[async_trait]
pub trait EntityStore<T: Entity>: Send + Sync {
    /// Transaction scope type handed out by [`EntityStore::begin`]
    type Transaction: StoreTransaction<T>;

    /// Short backend name for logs and errors
    fn backend_name(&self) -> &'static str;

    /// Open a transaction scope
    async fn begin(&self) -> Result<Self::Transaction, RepositoryError>;

    /// Rows matching the query, honoring ordering, includes, limit and offset
    async fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<T>, RepositoryError>;

    /// First row matching the query
    async fn fetch_optional(&self, query: &QueryBuilder) -> Result<Option<T>, RepositoryError> {
        let rows = self.fetch_all(&query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Number of rows matching the query filters; ordering and paging are ignored
    async fn count(&self, query: &QueryBuilder) -> Result<i64, RepositoryError>;

    /// Whether any row matches the query filters
    async fn exists(&self, query: &QueryBuilder) -> Result<bool, RepositoryError> {
        Ok(self.count(query).await? > 0)
    }

    /// Aggregate over `field` across the whole table; `Value::Null` when undefined
    async fn aggregate(
        &self,
        function: AggregateFunction,
        field: &ValidatedFieldName,
    ) -> Result<Value, RepositoryError>;

    /// Native statement passthrough, returning affected rows
    async fn execute_raw(&self, sql: &str, params: Vec<Value>) -> Result<u64, RepositoryError>;

    /// Batched insert in one round trip
    async fn bulk_insert(&self, entities: &[T]) -> Result<(), RepositoryError>;

    /// Batched update by primary key in one round trip
    async fn bulk_update(&self, entities: &[T]) -> Result<(), RepositoryError>;
}

/// Unit of work opened by [`EntityStore::begin`]
///
/// Dropping a transaction without committing rolls it back.
#[async_trait]
pub trait StoreTransaction<T: Entity>: Send {
    /// Persist a new row, returning it with store-assigned fields populated
    async fn insert(&mut self, entity: &T) -> Result<T, RepositoryError>;

    /// Overwrite the row with the entity's primary key
    async fn update(&mut self, entity: &T) -> Result<T, RepositoryError>;

    async fn commit(self) -> Result<(), RepositoryError>;

    async fn rollback(self) -> Result<(), RepositoryError>;
}
