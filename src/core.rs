//! Core RepoHaus functionality
//!
//! This module contains the RepoHaus coordinator: it owns the Postgres session and
//! the query cache and hands out repositories wired to both.

use cache_system::CacheManager;
use config::{AppConfig, DatabaseConfig};
use entity_store::{Entity, PgStore, Repository};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::RepoHausError;

/// Main RepoHaus coordinator
#[derive(Clone, Debug)]
pub struct RepoHaus {
    store: PgStore,
    cache: Arc<CacheManager>,
}

impl RepoHaus {
    /// Connect to the database and build the cache named in `config`
    pub async fn connect(config: AppConfig) -> Result<Self, RepoHausError> {
        config.validate()?;

        let pool = Self::connect_pool(&config.database).await?;
        let cache = CacheManager::new(config.cache)?;

        tracing::info!(
            host = %config.database.host,
            database = %config.database.database,
            cache_backend = ?cache.config().backend,
            "RepoHaus connected"
        );

        Ok(Self::from_parts(pool, Arc::new(cache)))
    }

    /// Wire an existing pool and cache manager
    pub fn from_parts(pool: PgPool, cache: Arc<CacheManager>) -> Self {
        Self {
            store: PgStore::new(pool),
            cache,
        }
    }

    async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, RepoHausError> {
        let connection_string = config.connection_string();

        let mut pool_options = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds));

        // Set max lifetime if specified
        if config.max_lifetime_seconds > 0 {
            pool_options =
                pool_options.max_lifetime(Duration::from_secs(config.max_lifetime_seconds));
        }

        Ok(pool_options.connect(&connection_string).await?)
    }

    /// Repository for `T` over the shared session, with the shared cache attached
    pub fn repository<T>(&self) -> Repository<T, PgStore>
    where
        T: Entity + for<'r> sqlx::FromRow<'r, PgRow>,
    {
        Repository::new(self.store.clone()).with_cache_manager(self.cache.clone())
    }

    /// Repository for `T` without a cache
    pub fn uncached_repository<T>(&self) -> Repository<T, PgStore>
    where
        T: Entity + for<'r> sqlx::FromRow<'r, PgRow>,
    {
        Repository::new(self.store.clone())
    }

    /// Get database pool reference
    pub fn pool(&self) -> &PgPool {
        self.store.pool()
    }

    pub fn store(&self) -> &PgStore {
        &self.store
    }

    pub fn cache(&self) -> &Arc<CacheManager> {
        &self.cache
    }

    /// Check database and cache health
    pub async fn health_check(&self) -> Result<(), RepoHausError> {
        self.store.ping().await?;
        self.cache.ping().await?;
        Ok(())
    }
}
