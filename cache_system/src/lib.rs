//! Cache system for memoized query results
//!
//! This crate provides the query cache used by repositories: a backend contract with
//! TTL-bound storage, an in-process backend, a Redis backend and the manager that builds
//! keys and (de)serializes cached results.

pub mod backend;
pub mod errors;
pub mod manager;
pub mod params;
pub mod prelude;

// Re-export centralized config
pub use config::{CacheBackendKind, CacheConfig, CacheKeyPolicy};

pub use backend::{CacheBackend, MemoryBackend, RedisBackend};
pub use errors::CacheError;
pub use manager::CacheManager;
pub use params::CacheParams;
