//! Cache parameter configuration
//!
//! This module defines the CacheParams struct
//! for configuring cache behavior and TTL settings per repository.

use crate::CacheManager;
use std::sync::Arc;

/// Cache parameters for configuring cache behavior per repository/entity
#[derive(Debug, Clone)]
pub struct CacheParams {
    /// The cache manager instance
    pub manager: Arc<CacheManager>,
    /// TTL for cached query results in seconds
    pub ttl: u64,
    /// Entity segment of cache keys
    pub prefix: String,
}

impl CacheParams {
    pub fn new(manager: Arc<CacheManager>, ttl: u64, prefix: &str) -> Self {
        Self {
            ttl,
            prefix: prefix.to_string(),
            manager,
        }
    }

    /// Parameters taking TTL from the manager's configuration
    pub fn with_defaults(manager: Arc<CacheManager>, prefix: &str) -> Self {
        let ttl = manager.config().query_ttl_seconds;
        Self::new(manager, ttl, prefix)
    }
}
