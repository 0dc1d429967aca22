//! Filter expressions
//!
//! A [`QueryFilter`] is an opaque predicate from the repository's point of view.
//! It has two capabilities: compiling to a SQL `WHERE` fragment (see
//! [`super::sql_generation::SqlGenerator`]) and evaluating against a JSON row.

use super::value::{compare_values, like_match, values_equal, JsonRow};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Query condition operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOperator {
    Eq,        // =
    Ne,        // !=
    Gt,        // >
    Gte,       // >=
    Lt,        // <
    Lte,       // <=
    Like,      // LIKE
    ILike,     // ILIKE (case insensitive)
    In,        // IN
    NotIn,     // NOT IN
    IsNull,    // IS NULL
    IsNotNull, // IS NOT NULL
}

/// Single condition in WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryCondition {
    pub field: String,
    pub operator: QueryOperator,
    pub value: Option<Value>, // None for IS NULL/IS NOT NULL
}

/// Logical operators for combining conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    And,
    Or,
}

/// Query filter that can be nested
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFilter {
    Condition(QueryCondition),
    Group {
        operator: LogicalOperator,
        filters: Vec<QueryFilter>,
    },
}

impl QueryFilter {
    /// Create a simple condition
    pub fn condition(field: &str, operator: QueryOperator, value: Option<Value>) -> Self {
        Self::Condition(QueryCondition {
            field: field.to_string(),
            operator,
            value,
        })
    }

    /// Create AND group
    pub fn and(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::And,
            filters,
        }
    }

    /// Create OR group
    pub fn or(filters: Vec<QueryFilter>) -> Self {
        Self::Group {
            operator: LogicalOperator::Or,
            filters,
        }
    }

    pub fn eq(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Eq, Some(value))
    }

    pub fn ne(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Ne, Some(value))
    }

    pub fn gt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gt, Some(value))
    }

    pub fn gte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Gte, Some(value))
    }

    pub fn lt(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lt, Some(value))
    }

    pub fn lte(field: &str, value: Value) -> Self {
        Self::condition(field, QueryOperator::Lte, Some(value))
    }

    /// LIKE condition (`%` any run, `_` one character)
    pub fn like(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::Like,
            Some(Value::String(pattern.to_string())),
        )
    }

    /// ILIKE condition (case insensitive)
    pub fn ilike(field: &str, pattern: &str) -> Self {
        Self::condition(
            field,
            QueryOperator::ILike,
            Some(Value::String(pattern.to_string())),
        )
    }

    pub fn in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::In, Some(Value::Array(values)))
    }

    pub fn not_in_values(field: &str, values: Vec<Value>) -> Self {
        Self::condition(field, QueryOperator::NotIn, Some(Value::Array(values)))
    }

    pub fn is_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNull, None)
    }

    pub fn is_not_null(field: &str) -> Self {
        Self::condition(field, QueryOperator::IsNotNull, None)
    }

    /// Combine with another filter under AND, flattening nested AND groups
    pub fn and_also(self, other: QueryFilter) -> Self {
        match self {
            QueryFilter::Group {
                operator: LogicalOperator::And,
                mut filters,
            } => {
                filters.push(other);
                Self::and(filters)
            }
            first => Self::and(vec![first, other]),
        }
    }

    /// Evaluate against a row with SQL semantics: any comparison touching NULL is false.
    /// Empty AND groups hold, empty OR groups do not.
    pub fn evaluate(&self, row: &JsonRow) -> bool {
        match self {
            QueryFilter::Condition(condition) => condition.evaluate(row),
            QueryFilter::Group { operator, filters } => match operator {
                LogicalOperator::And => filters.iter().all(|f| f.evaluate(row)),
                LogicalOperator::Or => filters.iter().any(|f| f.evaluate(row)),
            },
        }
    }
}

impl QueryCondition {
    fn evaluate(&self, row: &JsonRow) -> bool {
        let actual = row.get(&self.field).unwrap_or(&Value::Null);

        match (&self.operator, &self.value) {
            (QueryOperator::IsNull, _) | (QueryOperator::Eq, None) => actual.is_null(),
            (QueryOperator::IsNotNull, _) | (QueryOperator::Ne, None) => !actual.is_null(),
            (_, None) => false,
            (_, Some(_)) if actual.is_null() => false,
            (operator, Some(expected)) => match operator {
                QueryOperator::Eq => !expected.is_null() && values_equal(actual, expected),
                QueryOperator::Ne => !expected.is_null() && !values_equal(actual, expected),
                QueryOperator::Gt => compare_values(actual, expected) == Some(Ordering::Greater),
                QueryOperator::Gte => matches!(
                    compare_values(actual, expected),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                QueryOperator::Lt => compare_values(actual, expected) == Some(Ordering::Less),
                QueryOperator::Lte => matches!(
                    compare_values(actual, expected),
                    Some(Ordering::Less | Ordering::Equal)
                ),
                QueryOperator::Like | QueryOperator::ILike => {
                    match (actual.as_str(), expected.as_str()) {
                        (Some(text), Some(pattern)) => {
                            like_match(text, pattern, *operator == QueryOperator::ILike)
                        }
                        _ => false,
                    }
                }
                QueryOperator::In => match expected {
                    Value::Array(candidates) => {
                        candidates.iter().any(|candidate| values_equal(actual, candidate))
                    }
                    _ => false,
                },
                QueryOperator::NotIn => match expected {
                    Value::Array(candidates) => {
                        !candidates.iter().any(|candidate| values_equal(actual, candidate))
                    }
                    _ => true,
                },
                // actual is known to be non-null here
                QueryOperator::IsNull => false,
                QueryOperator::IsNotNull => true,
            },
        }
    }
}
