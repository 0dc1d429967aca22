use crate::errors::RepositoryError;
use crate::query_builder::QueryFilter;
use crate::traits::{Entity, EntityStore};
use cache_system::{CacheManager, CacheParams};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Generic repository over one entity type
pub struct Repository<T: Entity, S: EntityStore<T>> {
    pub(crate) store: S,
    pub(crate) cache: Option<CacheParams>,
    pub(crate) _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity, S: EntityStore<T> + Clone> Clone for Repository<T, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            cache: self.cache.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity, S: EntityStore<T>> std::fmt::Debug for Repository<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &T::entity_name())
            .field("backend", &self.store.backend_name())
            .field("has_cache", &self.has_cache())
            .finish()
    }
}

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: None,
            _phantom: PhantomData,
        }
    }

    /// Attach a query cache
    pub fn with_cache(mut self, cache: CacheParams) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a shared cache manager, keyed by the entity name with the manager's TTL
    pub fn with_cache_manager(self, manager: Arc<CacheManager>) -> Self {
        self.with_cache(CacheParams::with_defaults(manager, T::entity_name()))
    }

    /// Set cache parameters for this repository
    pub fn set_cache(&mut self, cache: CacheParams) {
        self.cache = Some(cache);
    }

    /// Remove cache from this repository
    pub fn remove_cache(&mut self) {
        self.cache = None;
    }

    /// Check if a cache is attached
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Base filter every "active" read path starts from
    pub(crate) fn active_filter() -> QueryFilter {
        QueryFilter::eq("is_active", Value::Bool(true))
    }

    pub(crate) fn id_filter(id: &T::Id) -> Result<QueryFilter, RepositoryError> {
        Ok(QueryFilter::eq(T::primary_key(), serde_json::to_value(id)?))
    }
}
