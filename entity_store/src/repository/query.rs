//! Lazy query sequences
//!
//! An [`EntityQuery`] only describes a read. Nothing touches the store until one of
//! its async terminal methods runs, and every call runs the query again.

use crate::errors::RepositoryError;
use crate::query_builder::{
    Includes, OrderBy, PagedResult, Pagination, QueryBuilder, QueryFilter, SortOrder,
};
use crate::traits::{Entity, EntityStore};
use std::marker::PhantomData;

pub struct EntityQuery<'r, T: Entity, S: EntityStore<T>> {
    store: &'r S,
    query: QueryBuilder,
    _phantom: PhantomData<fn() -> T>,
}

impl<'r, T: Entity, S: EntityStore<T>> Clone for EntityQuery<'r, T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store,
            query: self.query.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<'r, T: Entity, S: EntityStore<T>> std::fmt::Debug for EntityQuery<'r, T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityQuery")
            .field("entity", &T::entity_name())
            .field("query", &self.query)
            .finish()
    }
}

impl<'r, T: Entity, S: EntityStore<T>> EntityQuery<'r, T, S> {
    pub(crate) fn new(store: &'r S, query: QueryBuilder) -> Self {
        Self {
            store,
            query,
            _phantom: PhantomData,
        }
    }

    /// Narrow with another filter (logical AND)
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.query = self.query.filter(filter);
        self
    }

    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.query = self.query.order_by(field, order);
        self
    }

    pub fn ordered(mut self, order_by: &OrderBy) -> Self {
        self.query = self.query.ordered(order_by);
        self
    }

    /// Eagerly load a named relation
    pub fn include(mut self, path: &str) -> Self {
        self.query = self.query.include(path);
        self
    }

    pub fn includes(mut self, includes: &Includes) -> Self {
        self.query = self.query.includes(includes);
        self
    }

    pub fn skip(mut self, count: i64) -> Self {
        self.query = self.query.offset(count);
        self
    }

    pub fn take(mut self, count: i64) -> Self {
        self.query = self.query.limit(count);
        self
    }

    /// The query this sequence runs
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    pub fn into_query(self) -> QueryBuilder {
        self.query
    }

    pub async fn fetch_all(&self) -> Result<Vec<T>, RepositoryError> {
        crate::trace_log!(entity = T::entity_name(), query = ?self.query, "fetch_all");
        self.store.fetch_all(&self.query).await
    }

    pub async fn fetch_optional(&self) -> Result<Option<T>, RepositoryError> {
        self.store.fetch_optional(&self.query).await
    }

    /// Number of matches, ignoring ordering and window
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        self.store.count(&self.query).await
    }

    pub async fn exists(&self) -> Result<bool, RepositoryError> {
        self.store.exists(&self.query).await
    }

    /// One page of matches plus the total match count; `page` is 1-based
    pub async fn paged(&self, page: u32, page_size: u32) -> Result<PagedResult<T>, RepositoryError> {
        let window = Pagination::for_page(page, page_size).ok_or_else(|| {
            let field = if page == 0 { "page" } else { "page_size" };
            RepositoryError::validation(
                T::table_name(),
                field,
                format!("invalid page {} of size {}", page, page_size),
            )
        })?;

        let total_count = self.store.count(&self.query).await?;
        let items = self
            .store
            .fetch_all(&self.query.clone().offset(window.offset).limit(window.limit))
            .await?;

        Ok(PagedResult { total_count, items })
    }
}
