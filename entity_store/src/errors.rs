//! Error types for repository and store operations

use cache_system::CacheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The Postgres session refused or could not complete an operation
    #[error("Database error in {table}.{operation}: {source}")]
    Database {
        table: &'static str,
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// A store rejected the operation (constraint violation, missing row, ...)
    #[error("Store error in {table}.{operation}: {message}")]
    Store {
        table: &'static str,
        operation: &'static str,
        message: String,
    },

    #[error("Operation {operation} is not supported by the {backend} backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error in {table}.{field}: {message}")]
    Validation {
        table: &'static str,
        field: String,
        message: String,
    },

    #[error("Cache error during {operation}: {source}")]
    Cache {
        operation: &'static str,
        #[source]
        source: CacheError,
    },
}

impl RepositoryError {
    pub fn database_operation(table: &'static str, operation: &'static str, source: sqlx::Error) -> Self {
        Self::Database {
            table,
            operation,
            source,
        }
    }

    pub fn store(table: &'static str, operation: &'static str, message: impl Into<String>) -> Self {
        Self::Store {
            table,
            operation,
            message: message.into(),
        }
    }

    pub fn validation(table: &'static str, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            table,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn cache_operation(operation: &'static str, source: CacheError) -> Self {
        Self::Cache { operation, source }
    }

    /// Whether the failure originated in the underlying store
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Self::Database { .. } | Self::Store { .. } | Self::Unsupported { .. }
        )
    }
}
