//! Query builder utilities
//!
//! Backend-neutral query descriptions plus the pieces that compile them to SQL
//! or evaluate them against rows held in memory.

pub mod aggregation;
pub mod builder;
pub mod filter;
pub mod includes;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod value;

#[cfg(test)]
mod tests;

pub use aggregation::AggregateFunction;
pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use includes::Includes;
pub use ordering::{OrderBy, SortOrder};
pub use pagination::{PagedResult, Pagination};
pub use value::JsonRow;
