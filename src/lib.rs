//! # RepoHaus
//!
//! A generic data-access layer for PostgreSQL: uniform CRUD, a soft-delete lifecycle
//! layered over "active" reads, paging, aggregates, bulk writes and a query cache.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repohaus::prelude::*;
//!
//! #[entity(table = "products")]
//! pub struct Product {
//!     pub id: Uuid,
//!     pub name: String,
//!     pub price: f64,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repohaus = RepoHaus::connect(AppConfig::load()?).await?;
//!     let products = repohaus.repository::<Product>();
//!
//!     let added = products
//!         .add(Product::new(Uuid::new_v4(), "Widget".to_string(), 9.5))
//!         .await?;
//!
//!     let cheap = products
//!         .find(QueryFilter::lt("price", json!(10)))
//!         .fetch_all()
//!         .await?;
//!     println!("{} cheap products, first added {}", cheap.len(), added.name);
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::RepoHaus;
pub use errors::RepoHausError;

// Re-export centralized config
pub use config::{AppConfig, CacheConfig, DatabaseConfig};

// Logging macros live with the repository engine
pub use entity_store::{debug_log, trace_log};

// Re-export internal crates used by macros and public API
// These MUST be public for the generated macro code to work correctly
pub use cache_system;
pub use entity_derive;
pub use entity_store;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
