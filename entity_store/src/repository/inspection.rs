//! Existence checks, counting, paging, aggregates and raw statements
//!
//! Apart from `exists`, nothing here applies the active filter: callers see the
//! whole collection, soft-deleted rows included.

use super::Repository;
use crate::errors::RepositoryError;
use crate::query_builder::{AggregateFunction, PagedResult, QueryBuilder, QueryFilter};
use crate::traits::{Entity, EntityStore};
use crate::validation::ValidatedFieldName;
use serde::de::DeserializeOwned;
use serde_json::Value;

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    /// Whether an active entity with this id exists
    pub async fn exists(&self, id: &T::Id) -> Result<bool, RepositoryError> {
        let query = QueryBuilder::new()
            .filter(Self::id_filter(id)?)
            .filter(Self::active_filter());
        self.store.exists(&query).await
    }

    /// Whether any entity, active or not, matches
    pub async fn any(&self, filter: QueryFilter) -> Result<bool, RepositoryError> {
        self.query().filter(filter).exists().await
    }

    /// First match, active or not
    pub async fn first_or_default(&self, filter: QueryFilter) -> Result<Option<T>, RepositoryError> {
        self.query().filter(filter).fetch_optional().await
    }

    /// Page `page` (1-based) of all matches, active or not
    pub async fn get_paged(
        &self,
        filter: QueryFilter,
        page: u32,
        page_size: u32,
    ) -> Result<PagedResult<T>, RepositoryError> {
        self.query().filter(filter).paged(page, page_size).await
    }

    pub async fn count(&self, filter: QueryFilter) -> Result<i64, RepositoryError> {
        self.query().filter(filter).count().await
    }

    async fn aggregate(&self, function: AggregateFunction, field: &str) -> Result<Value, RepositoryError> {
        let field = ValidatedFieldName::new(field)
            .map_err(|e| RepositoryError::validation(T::table_name(), field, e.to_string()))?;
        crate::debug_log!(
            entity = T::entity_name(),
            function = function.to_sql(),
            field = field.as_str(),
            "aggregate"
        );
        self.store.aggregate(function, &field).await
    }

    /// Largest value of `field` across the collection; `None` when there are no values
    pub async fn max<V: DeserializeOwned>(&self, field: &str) -> Result<Option<V>, RepositoryError> {
        let value = self.aggregate(AggregateFunction::Max, field).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Smallest value of `field` across the collection; `None` when there are no values
    pub async fn min<V: DeserializeOwned>(&self, field: &str) -> Result<Option<V>, RepositoryError> {
        let value = self.aggregate(AggregateFunction::Min, field).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sum of `field`; zero for an empty collection
    pub async fn sum(&self, field: &str) -> Result<f64, RepositoryError> {
        let value = self.aggregate(AggregateFunction::Sum, field).await?;
        Ok(serde_json::from_value::<Option<f64>>(value)?.unwrap_or(0.0))
    }

    /// Mean of `field`; `None` for an empty collection
    pub async fn average(&self, field: &str) -> Result<Option<f64>, RepositoryError> {
        let value = self.aggregate(AggregateFunction::Avg, field).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Native statement passthrough, returning the affected row count
    ///
    /// Bypasses auditing, soft delete and the cache entirely.
    pub async fn execute_raw(&self, sql: &str, params: Vec<Value>) -> Result<u64, RepositoryError> {
        tracing::warn!(entity = T::entity_name(), "Executing raw statement");
        self.store.execute_raw(sql, params).await
    }
}
