//! In-process backend
//!
//! Rows are kept in their serde form, one table per entity type, and queries are
//! evaluated by [`QueryBuilder::matches`]. Writers are serialized: a transaction
//! holds the writer lock from `begin` until it commits or is dropped, and works on
//! a private copy of its table that replaces the shared one on commit.

use super::{resolve_query, validate_column};
use crate::errors::RepositoryError;
use crate::query_builder::value::{compare_nulls_last, compare_values, values_equal};
use crate::query_builder::{AggregateFunction, JsonRow, QueryBuilder, SortOrder};
use crate::traits::entity::CREATION_COLUMNS;
use crate::traits::{Entity, EntityStore, Relation, RelationKind, StoreTransaction};
use crate::validation::ValidatedFieldName;
use async_trait::async_trait;
use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

type Tables = HashMap<&'static str, Vec<JsonRow>>;

/// Store keeping every table in memory; clones share the same data
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    writer: Arc<Mutex<()>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows held for an entity type, active or not
    pub async fn row_count<T: Entity>(&self) -> usize {
        self.tables
            .read()
            .await
            .get(T::table_name())
            .map_or(0, Vec::len)
    }
}

fn to_row<T: Entity>(entity: &T) -> Result<JsonRow, RepositoryError> {
    match serde_json::to_value(entity)? {
        Value::Object(mut row) => {
            // Relations are expanded on read, never stored
            for relation in T::relations() {
                row.remove(relation.path);
            }
            Ok(row)
        }
        other => Err(RepositoryError::store(
            T::table_name(),
            "serialize",
            format!("expected an object, got {}", other),
        )),
    }
}

fn from_row<T: Entity>(row: JsonRow) -> Result<T, RepositoryError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

fn primary_key_of<'a, T: Entity>(row: &'a JsonRow) -> &'a Value {
    row.get(T::primary_key()).unwrap_or(&Value::Null)
}

fn position_of<T: Entity>(rows: &[JsonRow], key: &Value) -> Option<usize> {
    rows.iter()
        .position(|row| values_equal(primary_key_of::<T>(row), key))
}

fn insert_row<T: Entity>(rows: &mut Vec<JsonRow>, row: JsonRow) -> Result<(), RepositoryError> {
    let key = primary_key_of::<T>(&row);
    if position_of::<T>(rows, key).is_some() {
        return Err(RepositoryError::store(
            T::table_name(),
            "insert",
            format!("duplicate key {} = {}", T::primary_key(), key),
        ));
    }
    rows.push(row);
    Ok(())
}

/// Replace the stored row, keeping its creation stamps; returns the row as stored
fn update_row<T: Entity>(rows: &mut [JsonRow], mut row: JsonRow) -> Result<JsonRow, RepositoryError> {
    let key = primary_key_of::<T>(&row);
    match position_of::<T>(rows, key) {
        Some(index) => {
            for column in CREATION_COLUMNS {
                if let Some(stored) = rows[index].get(column) {
                    row.insert(column.to_string(), stored.clone());
                }
            }
            rows[index] = row.clone();
            Ok(row)
        }
        None => Err(RepositoryError::store(
            T::table_name(),
            "update",
            format!("no row matched {} = {}", T::primary_key(), key),
        )),
    }
}

fn expand_relation(tables: &Tables, row: &JsonRow, relation: &Relation) -> Value {
    let local = row.get(relation.local_key).unwrap_or(&Value::Null);
    let mut related = tables
        .get(relation.table)
        .into_iter()
        .flatten()
        .filter(|candidate| {
            !local.is_null()
                && values_equal(
                    candidate.get(relation.foreign_key).unwrap_or(&Value::Null),
                    local,
                )
        })
        .map(|candidate| Value::Object(candidate.clone()));

    match relation.kind {
        RelationKind::One => related.next().unwrap_or(Value::Null),
        RelationKind::Many => Value::Array(related.collect()),
    }
}

fn compare_rows(left: &JsonRow, right: &JsonRow, ordering: &[(String, SortOrder)]) -> Ordering {
    ordering
        .iter()
        .map(|(field, order)| {
            let a = left.get(field).unwrap_or(&Value::Null);
            let b = right.get(field).unwrap_or(&Value::Null);
            match order {
                SortOrder::Asc => compare_nulls_last(a, b),
                // Descending puts NULLs first, mirroring Postgres defaults
                SortOrder::Desc => compare_nulls_last(a, b).reverse(),
            }
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn aggregate_values<'a>(
    function: AggregateFunction,
    values: impl Iterator<Item = &'a Value>,
) -> Value {
    let values: Vec<&Value> = values.filter(|v| !v.is_null()).collect();
    let numbers = || values.iter().filter_map(|v| v.as_f64());

    match function {
        AggregateFunction::Count => Value::from(values.len()),
        AggregateFunction::Sum => {
            if values.iter().all(|v| v.is_i64()) {
                Value::from(values.iter().filter_map(|v| v.as_i64()).sum::<i64>())
            } else {
                Number::from_f64(numbers().sum()).map_or(Value::Null, Value::Number)
            }
        }
        AggregateFunction::Avg => {
            let count = numbers().count();
            if count == 0 {
                Value::Null
            } else {
                Number::from_f64(numbers().sum::<f64>() / count as f64)
                    .map_or(Value::Null, Value::Number)
            }
        }
        AggregateFunction::Min | AggregateFunction::Max => {
            let wanted = if function == AggregateFunction::Min {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            values
                .iter()
                .copied()
                .reduce(|best, candidate| {
                    if compare_values(candidate, best) == Some(wanted) {
                        candidate
                    } else {
                        best
                    }
                })
                .cloned()
                .unwrap_or(Value::Null)
        }
    }
}

#[async_trait]
impl<T: Entity> EntityStore<T> for MemoryStore {
    type Transaction = MemoryTransaction<T>;

    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> Result<Self::Transaction, RepositoryError> {
        let guard = self.writer.clone().lock_owned().await;
        let staged = self
            .tables
            .read()
            .await
            .get(T::table_name())
            .cloned()
            .unwrap_or_default();

        crate::trace_log!(table = T::table_name(), "memory transaction started");
        Ok(MemoryTransaction {
            store: self.clone(),
            staged,
            _writer: guard,
            _phantom: PhantomData,
        })
    }

    async fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<T>, RepositoryError> {
        let relations = resolve_query::<T>(query)?;
        let tables = self.tables.read().await;

        let mut rows: Vec<JsonRow> = tables
            .get(T::table_name())
            .into_iter()
            .flatten()
            .filter(|row| query.matches(row))
            .cloned()
            .collect();

        for row in rows.iter_mut() {
            for relation in &relations {
                let expanded = expand_relation(&tables, row, relation);
                row.insert(relation.path.to_string(), expanded);
            }
        }
        drop(tables);

        if !query.ordering().is_empty() {
            rows.sort_by(|a, b| compare_rows(a, b, query.ordering()));
        }

        let (limit, offset) = query.window();
        let offset = usize::try_from(offset.unwrap_or(0)).unwrap_or(0);
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));

        rows.into_iter()
            .skip(offset)
            .take(limit)
            .map(from_row::<T>)
            .collect()
    }

    async fn count(&self, query: &QueryBuilder) -> Result<i64, RepositoryError> {
        let counted = query.filters_only();
        resolve_query::<T>(&counted)?;

        let tables = self.tables.read().await;
        let total = tables
            .get(T::table_name())
            .into_iter()
            .flatten()
            .filter(|row| counted.matches(row))
            .count();
        Ok(total as i64)
    }

    async fn aggregate(
        &self,
        function: AggregateFunction,
        field: &ValidatedFieldName,
    ) -> Result<Value, RepositoryError> {
        validate_column::<T>(field.as_str())?;

        let tables = self.tables.read().await;
        let values = tables
            .get(T::table_name())
            .into_iter()
            .flatten()
            .map(|row| row.get(field.as_str()).unwrap_or(&Value::Null));
        Ok(aggregate_values(function, values))
    }

    async fn execute_raw(&self, _sql: &str, _params: Vec<Value>) -> Result<u64, RepositoryError> {
        Err(RepositoryError::Unsupported {
            backend: "memory",
            operation: "execute_raw",
        })
    }

    async fn bulk_insert(&self, entities: &[T]) -> Result<(), RepositoryError> {
        let rows = entities.iter().map(to_row::<T>).collect::<Result<Vec<_>, _>>()?;
        let _writer = self.writer.lock().await;
        let mut tables = self.tables.write().await;

        // All or nothing: stage against a copy
        let mut staged = tables.get(T::table_name()).cloned().unwrap_or_default();
        for row in rows {
            insert_row::<T>(&mut staged, row)?;
        }
        tables.insert(T::table_name(), staged);
        Ok(())
    }

    async fn bulk_update(&self, entities: &[T]) -> Result<(), RepositoryError> {
        let rows = entities.iter().map(to_row::<T>).collect::<Result<Vec<_>, _>>()?;
        let _writer = self.writer.lock().await;
        let mut tables = self.tables.write().await;

        let mut staged = tables.get(T::table_name()).cloned().unwrap_or_default();
        for row in rows {
            update_row::<T>(&mut staged, row)?;
        }
        tables.insert(T::table_name(), staged);
        Ok(())
    }
}

/// Unit of work over one [`MemoryStore`] table
///
/// Writes land in a private copy; dropping without `commit` discards them.
pub struct MemoryTransaction<T> {
    store: MemoryStore,
    staged: Vec<JsonRow>,
    _writer: OwnedMutexGuard<()>,
    _phantom: PhantomData<fn() -> T>,
}

#[async_trait]
impl<T: Entity> StoreTransaction<T> for MemoryTransaction<T> {
    async fn insert(&mut self, entity: &T) -> Result<T, RepositoryError> {
        let row = to_row(entity)?;
        insert_row::<T>(&mut self.staged, row.clone())?;
        from_row(row)
    }

    async fn update(&mut self, entity: &T) -> Result<T, RepositoryError> {
        let row = to_row(entity)?;
        let stored = update_row::<T>(&mut self.staged, row)?;
        from_row(stored)
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        let MemoryTransaction { store, staged, .. } = self;
        store.tables.write().await.insert(T::table_name(), staged);
        crate::trace_log!(table = T::table_name(), "memory transaction committed");
        Ok(())
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        crate::trace_log!(table = T::table_name(), "memory transaction rolled back");
        Ok(())
    }
}
