//! Convenience re-exports for common RepoHaus usage
//!
//! This prelude module re-exports the most commonly used items from the RepoHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use repohaus::prelude::*;
//!
//! // Entities, repositories, query builders and config are now in scope
//! ```

// Core RepoHaus components
pub use crate::core::RepoHaus;
pub use crate::errors::RepoHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, CacheKeyPolicy, DatabaseConfig};

// Re-export commonly used entity-store types for convenience
pub use entity_store::prelude::*;

// Re-export entity_store module for macro-generated code
pub use entity_store;

// Re-export cache system
pub use cache_system::prelude::*;

// Entity definitions
pub use entity_derive::entity;

// Common external dependencies
pub use anyhow;
pub use async_trait;
pub use sqlx;
pub use tokio;
