//! Cache backends
//!
//! A backend stores opaque string payloads under string keys with a time-to-live.
//! Entries are never modified in place; a key is either absent, live or expired.

mod memory_backend;
mod redis_backend;

pub use self::memory_backend::MemoryBackend;
pub use self::redis_backend::RedisBackend;

use crate::errors::CacheError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Storage contract consumed by [`crate::CacheManager`]
#[async_trait]
pub trait CacheBackend: Send + Sync + Debug {
    /// Look up a live entry; expired entries read as a miss
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store an entry that expires after `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a single entry, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry whose key starts with `prefix`, returning how many were removed
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Connectivity check
    async fn ping(&self) -> Result<(), CacheError>;
}
