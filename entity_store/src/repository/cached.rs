//! Cached reads
//!
//! `get_all_with_cache` memoizes whole result sets for the cache window. Writes
//! never invalidate; a read right after a write may see the old result until the
//! entry expires or [`Repository::invalidate_cache`] is called.
//!
//! With [`CacheKeyPolicy::TypeScoped`] the key only names the entity type, so the
//! first call's filter, ordering and includes decide what every later call sees
//! until expiry. [`CacheKeyPolicy::Parameterized`] adds a hash of the full query.

use super::Repository;
use crate::errors::RepositoryError;
use crate::query_builder::{Includes, OrderBy, QueryFilter};
use crate::traits::{Entity, EntityStore};
use cache_system::CacheKeyPolicy;

const OPERATION: &str = "get_all_with_cache";

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    /// [`Repository::get_all_with`], memoized through the attached cache
    ///
    /// Without a cache the query runs directly.
    pub async fn get_all_with_cache(
        &self,
        filter: Option<QueryFilter>,
        order_by: Option<&OrderBy>,
        includes: Option<&Includes>,
    ) -> Result<Vec<T>, RepositoryError> {
        let query = self.get_all_with(filter, order_by, includes);
        let Some(cache) = &self.cache else {
            return query.fetch_all().await;
        };

        let query_hash = match cache.manager.key_policy() {
            CacheKeyPolicy::TypeScoped => None,
            CacheKeyPolicy::Parameterized => {
                Some(cache.manager.hash_query(&query.query().fingerprint()))
            }
        };
        let key = cache
            .manager
            .build_query_key(&cache.prefix, OPERATION, query_hash.as_deref());

        if let Some(cached) = cache
            .manager
            .get_query::<T>(&key)
            .await
            .map_err(|e| RepositoryError::cache_operation(OPERATION, e))?
        {
            crate::debug_log!(entity = T::entity_name(), %key, "cache hit");
            return Ok(cached);
        }

        crate::debug_log!(entity = T::entity_name(), %key, "cache miss");
        let results = query.fetch_all().await?;
        cache
            .manager
            .set_query_with_ttl(&key, &results, cache.ttl)
            .await
            .map_err(|e| RepositoryError::cache_operation(OPERATION, e))?;

        Ok(results)
    }

    /// Drop every cached query result for this entity; returns removed entries
    pub async fn invalidate_cache(&self) -> Result<u64, RepositoryError> {
        match &self.cache {
            Some(cache) => cache
                .manager
                .invalidate_queries(&cache.prefix)
                .await
                .map_err(|e| RepositoryError::cache_operation("invalidate_cache", e)),
            None => Ok(0),
        }
    }
}
