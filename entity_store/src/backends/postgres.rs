//! Postgres backend
//!
//! Entities travel to the database as a single JSONB parameter and are expanded
//! with `jsonb_populate_record`, so statements only depend on table metadata and
//! never on the Rust field layout.

use super::{resolve_query, validate_column};
use crate::errors::RepositoryError;
use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::{AggregateFunction, QueryBuilder};
use crate::traits::entity::CREATION_COLUMNS;
use crate::traits::{Entity, EntityStore, StoreTransaction};
use crate::validation::ValidatedFieldName;
use crate::DbPool;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{Postgres, Row, Transaction};
use std::marker::PhantomData;

// Shared parameter binding: strings that look like timestamps or UUIDs are bound
// with those types so they compare against typed columns
macro_rules! bind_json_param {
    ($query:expr, $param:expr) => {
        match $param {
            Value::String(s) => {
                if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(&s) {
                    $query.bind(dt.with_timezone(&chrono::Utc))
                } else if let Ok(uuid) = uuid::Uuid::parse_str(&s) {
                    $query.bind(uuid)
                } else {
                    $query.bind(s)
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                        $query.bind(i as i32)
                    } else {
                        $query.bind(i)
                    }
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            Value::Bool(b) => $query.bind(b),
            Value::Null => $query.bind(Option::<String>::None),
            other => $query.bind(sqlx::types::Json(other)),
        }
    };
}

fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: Vec<Value>,
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = bind_json_param!(query, param);
    }
    query
}

fn bind_params_as<'q, T>(
    mut query: QueryAs<'q, Postgres, T, PgArguments>,
    params: Vec<Value>,
) -> QueryAs<'q, Postgres, T, PgArguments> {
    for param in params {
        query = bind_json_param!(query, param);
    }
    query
}

fn to_json<T: Entity>(entity: &T) -> Result<sqlx::types::Json<Value>, RepositoryError> {
    Ok(sqlx::types::Json(serde_json::to_value(entity)?))
}

/// `UPDATE ... SET (cols) = ROW(r.cols) FROM <source> AS r WHERE pk matches`
///
/// The primary key and the creation stamps are never part of the SET list.
fn update_from_sql<T: Entity>(source: &str) -> String {
    let table = T::table_name();
    let pk = T::primary_key();
    let columns: Vec<&str> = T::columns()
        .iter()
        .copied()
        .filter(|c| *c != pk && !CREATION_COLUMNS.contains(c))
        .collect();
    let sources: Vec<String> = columns.iter().map(|c| format!("r.{}", c)).collect();

    format!(
        "UPDATE {table} SET ({}) = ROW({}) FROM {source} AS r WHERE {table}.{pk} = r.{pk} RETURNING {table}.*",
        columns.join(", "),
        sources.join(", "),
    )
}

/// Postgres-backed store sharing one connection pool across entity types
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Round trip to the database
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation("-", "ping", e))?;
        Ok(())
    }

    fn select_sql<T: Entity>(query: &QueryBuilder) -> Result<(String, Vec<Value>), RepositoryError> {
        let relations = resolve_query::<T>(query)?;
        let table = T::table_name();

        let mut select = format!("{}.*", table);
        for relation in relations {
            select.push_str(", ");
            select.push_str(&SqlGenerator::build_include_column(table, relation));
        }

        let (where_clause, order_clause, limit_clause, values) = query.build();
        let sql = [
            format!("SELECT {} FROM {}", select, table),
            where_clause,
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Ok((sql, values))
    }
}

#[async_trait]
impl<T> EntityStore<T> for PgStore
where
    T: Entity + for<'r> sqlx::FromRow<'r, PgRow>,
{
    type Transaction = PgStoreTransaction<T>;

    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> Result<Self::Transaction, RepositoryError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "begin", e))?;
        Ok(PgStoreTransaction {
            tx,
            _phantom: PhantomData,
        })
    }

    async fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<T>, RepositoryError> {
        let (sql, values) = Self::select_sql::<T>(query)?;
        crate::debug_log!(table = T::table_name(), %sql, "fetch_all");

        bind_params_as(sqlx::query_as::<_, T>(&sql), values)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "fetch_all", e))
    }

    async fn fetch_optional(&self, query: &QueryBuilder) -> Result<Option<T>, RepositoryError> {
        let (sql, values) = Self::select_sql::<T>(&query.clone().limit(1))?;
        crate::debug_log!(table = T::table_name(), %sql, "fetch_optional");

        bind_params_as(sqlx::query_as::<_, T>(&sql), values)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "fetch_optional", e))
    }

    async fn count(&self, query: &QueryBuilder) -> Result<i64, RepositoryError> {
        let counted = query.filters_only();
        resolve_query::<T>(&counted)?;

        // No ORDER BY or LIMIT for COUNT
        let (where_clause, values) = counted.build_where_clause();
        let mut sql = format!("SELECT COUNT(*) AS total FROM {}", T::table_name());
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        crate::debug_log!(table = T::table_name(), %sql, "count");

        let row = bind_params(sqlx::query(&sql), values)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "count", e))?;

        row.try_get::<i64, _>("total")
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "count", e))
    }

    async fn aggregate(
        &self,
        function: AggregateFunction,
        field: &ValidatedFieldName,
    ) -> Result<Value, RepositoryError> {
        validate_column::<T>(field.as_str())?;
        let sql = format!(
            "SELECT {} FROM {}",
            SqlGenerator::build_aggregate_expression(function, field.as_str()),
            T::table_name()
        );
        crate::debug_log!(table = T::table_name(), %sql, "aggregate");

        let row = sqlx::query(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "aggregate", e))?;

        let value: Option<Value> = row
            .try_get("value")
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "aggregate", e))?;
        Ok(value.unwrap_or(Value::Null))
    }

    async fn execute_raw(&self, sql: &str, params: Vec<Value>) -> Result<u64, RepositoryError> {
        crate::debug_log!(table = T::table_name(), sql, "execute_raw");

        let result = bind_params(sqlx::query(sql), params)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "execute_raw", e))?;
        Ok(result.rows_affected())
    }

    async fn bulk_insert(&self, entities: &[T]) -> Result<(), RepositoryError> {
        if entities.is_empty() {
            return Ok(());
        }

        let sql = format!(
            "INSERT INTO {table} SELECT * FROM jsonb_populate_recordset(NULL::{table}, $1)",
            table = T::table_name()
        );
        let payload = sqlx::types::Json(serde_json::to_value(entities)?);

        sqlx::query(&sql)
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "bulk_insert", e))?;
        Ok(())
    }

    async fn bulk_update(&self, entities: &[T]) -> Result<(), RepositoryError> {
        if entities.is_empty() {
            return Ok(());
        }

        let sql = update_from_sql::<T>(&format!(
            "jsonb_populate_recordset(NULL::{}, $1)",
            T::table_name()
        ));
        let payload = sqlx::types::Json(serde_json::to_value(entities)?);

        sqlx::query(&sql)
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "bulk_update", e))?;
        Ok(())
    }
}

/// A transactional context for [`PgStore`] writes
///
/// Wraps a sqlx transaction; dropping it without `commit` rolls back.
pub struct PgStoreTransaction<T> {
    tx: Transaction<'static, Postgres>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> PgStoreTransaction<T> {
    /// Get a mutable reference to the underlying transaction
    /// Use this to execute additional statements within the same unit of work
    pub fn as_mut(&mut self) -> &mut Transaction<'static, Postgres> {
        &mut self.tx
    }
}

#[async_trait]
impl<T> StoreTransaction<T> for PgStoreTransaction<T>
where
    T: Entity + for<'r> sqlx::FromRow<'r, PgRow>,
{
    async fn insert(&mut self, entity: &T) -> Result<T, RepositoryError> {
        let sql = format!(
            "INSERT INTO {table} SELECT * FROM jsonb_populate_record(NULL::{table}, $1) RETURNING *",
            table = T::table_name()
        );

        sqlx::query_as::<_, T>(&sql)
            .bind(to_json(entity)?)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "insert", e))
    }

    async fn update(&mut self, entity: &T) -> Result<T, RepositoryError> {
        let sql = update_from_sql::<T>(&format!(
            "jsonb_populate_record(NULL::{}, $1)",
            T::table_name()
        ));

        sqlx::query_as::<_, T>(&sql)
            .bind(to_json(entity)?)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "update", e))?
            .ok_or_else(|| {
                RepositoryError::store(
                    T::table_name(),
                    "update",
                    format!("no row matched {} = {:?}", T::primary_key(), entity.id()),
                )
            })
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.tx
            .commit()
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "commit", e))
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| RepositoryError::database_operation(T::table_name(), "rollback", e))
    }
}
