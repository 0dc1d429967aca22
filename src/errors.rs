//! Error types for the RepoHaus crate
//!
//! This module contains all error types that can be returned by RepoHaus operations.

use cache_system::CacheError;
use config::ConfigError;
use entity_store::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
