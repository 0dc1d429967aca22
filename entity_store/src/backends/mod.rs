//! Store backends
//!
//! [`PgStore`] runs queries against Postgres; [`MemoryStore`] keeps rows as JSON in
//! process and evaluates the same query descriptions itself.

mod memory;
mod postgres;

pub use memory::{MemoryStore, MemoryTransaction};
pub use postgres::{PgStore, PgStoreTransaction};

use crate::errors::RepositoryError;
use crate::query_builder::QueryBuilder;
use crate::traits::{Entity, Relation};
use crate::validation::{ValidatedFieldName, ValidatedTableName};

/// Check every identifier a query references against the entity's metadata and
/// resolve its include paths
pub(crate) fn resolve_query<T: Entity>(
    query: &QueryBuilder,
) -> Result<Vec<&'static Relation>, RepositoryError> {
    for field in query.referenced_fields() {
        validate_column::<T>(field)?;
    }

    query
        .include_paths()
        .iter()
        .map(|path| -> Result<&'static Relation, RepositoryError> {
            let relation = T::relation(path).ok_or_else(|| {
                RepositoryError::validation(
                    T::table_name(),
                    path.as_str(),
                    format!("unknown include path for {}", T::entity_name()),
                )
            })?;
            validate_relation::<T>(relation)?;
            Ok(relation)
        })
        .collect()
}

/// Relation metadata is interpolated into include subqueries, so every name in it
/// must be a safe identifier and the local key a column of `T`
fn validate_relation<T: Entity>(relation: &Relation) -> Result<(), RepositoryError> {
    let invalid = |e: crate::validation::ValidationError| {
        RepositoryError::validation(T::table_name(), relation.path, e.to_string())
    };

    ValidatedFieldName::new(relation.path).map_err(invalid)?;
    ValidatedTableName::new(relation.table).map_err(invalid)?;
    ValidatedFieldName::new(relation.foreign_key).map_err(invalid)?;
    validate_column::<T>(relation.local_key)?;
    Ok(())
}

/// A column name that is both a safe identifier and persisted by `T`
pub(crate) fn validate_column<T: Entity>(field: &str) -> Result<ValidatedFieldName, RepositoryError> {
    let validated = ValidatedFieldName::new(field)
        .map_err(|e| RepositoryError::validation(T::table_name(), field, e.to_string()))?;

    if !T::columns().contains(&field) {
        return Err(RepositoryError::validation(
            T::table_name(),
            field,
            format!("not a column of {}", T::table_name()),
        ));
    }

    Ok(validated)
}
