//! Cache manager implementation
//!
//! This module provides the main CacheManager struct: key construction,
//! typed storage of query results and invalidation over a [`CacheBackend`].

use crate::backend::{CacheBackend, MemoryBackend, RedisBackend};
use crate::errors::CacheError;
use config::{CacheBackendKind, CacheConfig, CacheKeyPolicy};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

/// Query result cache shared by every repository wired to it
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    config: Arc<CacheConfig>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("config", &self.config)
            .field("backend", &self.backend)
            .finish()
    }
}

impl CacheManager {
    /// Create a new cache manager with the backend named in the configuration
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let backend: Arc<dyn CacheBackend> = match config.backend {
            CacheBackendKind::Memory => Arc::new(MemoryBackend::new()),
            CacheBackendKind::Redis => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    CacheError::Misconfigured("redis backend requires redis_url".to_string())
                })?;
                Arc::new(RedisBackend::new(url)?)
            }
        };

        Ok(Self::with_backend(config, backend))
    }

    /// Create a cache manager over an existing backend
    pub fn with_backend(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// In-process cache with default settings
    pub fn in_memory() -> Self {
        Self::with_backend(CacheConfig::default(), Arc::new(MemoryBackend::new()))
    }

    /// Generate cache key for query results
    ///
    /// `query_hash` is only appended when the caller asks for parameterized keys.
    pub fn build_query_key(&self, prefix: &str, operation: &str, query_hash: Option<&str>) -> String {
        match query_hash {
            Some(hash) => format!(
                "{}:{}:query:{}:{}",
                self.config.key_prefix, prefix, operation, hash
            ),
            None => format!("{}:{}:query:{}", self.config.key_prefix, prefix, operation),
        }
    }

    fn query_key_prefix(&self, prefix: &str) -> String {
        format!("{}:{}:query:", self.config.key_prefix, prefix)
    }

    /// Generate hash for query parameters
    pub fn hash_query<T: Hash + ?Sized>(&self, query: &T) -> String {
        let mut hasher = DefaultHasher::new();
        query.hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }

    /// Get query results from cache
    pub async fn get_query<T>(&self, cache_key: &str) -> Result<Option<Vec<T>>, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.backend.get(cache_key).await? {
            Some(json_str) => {
                tracing::trace!(key = cache_key, "query cache hit");
                let values: Vec<T> = serde_json::from_str(&json_str)?;
                Ok(Some(values))
            }
            None => {
                tracing::trace!(key = cache_key, "query cache miss");
                Ok(None)
            }
        }
    }

    /// Set query results in cache with the configured query TTL
    pub async fn set_query<T>(&self, cache_key: &str, results: &[T]) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_query_with_ttl(cache_key, results, self.config.query_ttl_seconds)
            .await
    }

    /// Set query results in cache with custom TTL in seconds
    pub async fn set_query_with_ttl<T>(
        &self,
        cache_key: &str,
        results: &[T],
        ttl: u64,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        if ttl == 0 {
            return Err(CacheError::InvalidTtl(ttl));
        }
        let json_str = serde_json::to_string(results)?;
        self.backend
            .set(cache_key, json_str, Duration::from_secs(ttl))
            .await
    }

    /// Invalidate all query cache entries under an entity prefix
    pub async fn invalidate_queries(&self, prefix: &str) -> Result<u64, CacheError> {
        let removed = self
            .backend
            .delete_prefix(&self.query_key_prefix(prefix))
            .await?;
        tracing::debug!(prefix, removed, "query cache invalidated");
        Ok(removed)
    }

    /// Check backend connectivity
    pub async fn ping(&self) -> Result<(), CacheError> {
        self.backend.ping().await
    }

    /// Key policy applied by repositories using this manager
    pub fn key_policy(&self) -> CacheKeyPolicy {
        self.config.key_policy
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: u32,
        name: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, name: "a".into() },
            Row { id: 2, name: "b".into() },
        ]
    }

    #[test]
    fn test_query_key_layout() {
        let manager = CacheManager::in_memory();
        assert_eq!(
            manager.build_query_key("Product", "get_all_with_cache", None),
            "repohaus:Product:query:get_all_with_cache"
        );
        assert_eq!(
            manager.build_query_key("Product", "get_all_with_cache", Some("ff")),
            "repohaus:Product:query:get_all_with_cache:ff"
        );
    }

    #[test]
    fn test_hash_query_is_deterministic() {
        let manager = CacheManager::in_memory();
        assert_eq!(manager.hash_query("a = 1"), manager.hash_query("a = 1"));
        assert_ne!(manager.hash_query("a = 1"), manager.hash_query("a = 2"));
    }

    #[tokio::test]
    async fn test_round_trip_and_invalidate() {
        let manager = CacheManager::in_memory();
        let key = manager.build_query_key("Row", "get_all_with_cache", None);

        assert_eq!(manager.get_query::<Row>(&key).await.unwrap(), None);
        manager.set_query(&key, &rows()).await.unwrap();
        assert_eq!(manager.get_query::<Row>(&key).await.unwrap(), Some(rows()));

        assert_eq!(manager.invalidate_queries("Row").await.unwrap(), 1);
        assert_eq!(manager.get_query::<Row>(&key).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_expires_with_configured_ttl() {
        let manager = CacheManager::in_memory();
        let key = manager.build_query_key("Row", "get_all_with_cache", None);
        manager.set_query(&key, &rows()).await.unwrap();

        tokio::time::advance(Duration::from_secs(manager.config().query_ttl_seconds + 1)).await;
        assert_eq!(manager.get_query::<Row>(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let manager = CacheManager::in_memory();
        let err = manager.set_query_with_ttl("k", &rows(), 0).await;
        assert!(matches!(err, Err(CacheError::InvalidTtl(0))));
    }

    #[test]
    fn test_redis_backend_requires_url() {
        let mut config = CacheConfig::default();
        config.backend = CacheBackendKind::Redis;
        assert!(matches!(
            CacheManager::new(config),
            Err(CacheError::Misconfigured(_))
        ));
    }
}
