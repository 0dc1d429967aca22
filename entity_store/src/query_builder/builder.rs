//! Query builder
//!
//! A [`QueryBuilder`] is the backend-neutral description of one read: filters,
//! ordering, includes and an optional window. Backends either compile it to SQL
//! or evaluate it against rows in memory.

use crate::query_builder::filter::QueryFilter;
use crate::query_builder::includes::Includes;
use crate::query_builder::ordering::{OrderBy, SortOrder};
use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::value::JsonRow;
use serde::Serialize;
use serde_json::Value;

/// Query builder for constructing database queries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) includes: Includes,
    pub(crate) limit: Option<i64>,
    pub(crate) offset: Option<i64>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Append every key of an [`OrderBy`]
    pub fn ordered(mut self, order_by: &OrderBy) -> Self {
        self.order_by.extend(order_by.fields().iter().cloned());
        self
    }

    /// Eagerly load a named relation
    pub fn include(mut self, path: &str) -> Self {
        self.includes = self.includes.with(path);
        self
    }

    pub fn includes(mut self, includes: &Includes) -> Self {
        for path in includes.paths() {
            self.includes = self.includes.with(path);
        }
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn conditions(&self) -> &[QueryFilter] {
        &self.conditions
    }

    pub fn ordering(&self) -> &[(String, SortOrder)] {
        &self.order_by
    }

    pub fn include_paths(&self) -> &[String] {
        self.includes.paths()
    }

    pub fn window(&self) -> (Option<i64>, Option<i64>) {
        (self.limit, self.offset)
    }

    /// Same filters, without ordering, includes or window; what `COUNT` needs
    pub fn filters_only(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            ..Self::default()
        }
    }

    /// Every column name referenced by filters or ordering
    pub fn referenced_fields(&self) -> Vec<&str> {
        fn collect<'a>(filter: &'a QueryFilter, out: &mut Vec<&'a str>) {
            match filter {
                QueryFilter::Condition(condition) => out.push(&condition.field),
                QueryFilter::Group { filters, .. } => {
                    filters.iter().for_each(|f| collect(f, out));
                }
            }
        }

        let mut fields = Vec::new();
        self.conditions.iter().for_each(|f| collect(f, &mut fields));
        fields.extend(self.order_by.iter().map(|(field, _)| field.as_str()));
        fields
    }

    /// Whether a row satisfies every filter
    pub fn matches(&self, row: &JsonRow) -> bool {
        self.conditions.iter().all(|filter| filter.evaluate(row))
    }

    /// Stable textual form of the whole query, suitable for hashing into cache keys
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Build WHERE clause
    pub fn build_where_clause(&self) -> (String, Vec<Value>) {
        SqlGenerator::build_where_clause(&self.conditions)
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(&self) -> String {
        SqlGenerator::build_order_clause(&self.order_by)
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(&self) -> String {
        SqlGenerator::build_limit_clause(self.limit, self.offset)
    }

    /// Build complete query parts (WHERE, ORDER BY, LIMIT, Values)
    pub fn build(&self) -> (String, String, String, Vec<Value>) {
        let (where_clause, values) = self.build_where_clause();
        let order_clause = self.build_order_clause();
        let limit_clause = self.build_limit_clause();

        (where_clause, order_clause, limit_clause, values)
    }
}
