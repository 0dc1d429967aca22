//! SQL generation
//!
//! Turns query builder parts into Postgres fragments. Values are never
//! interpolated; each one becomes a `$n` placeholder in the order it is pushed.

use crate::query_builder::aggregation::AggregateFunction;
use crate::query_builder::filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
use crate::query_builder::ordering::SortOrder;
use crate::traits::{Relation, RelationKind};
use serde_json::Value;

pub struct SqlGenerator;

impl SqlGenerator {
    /// Build WHERE clause from conditions
    pub fn build_where_clause(conditions: &[QueryFilter]) -> (String, Vec<Value>) {
        if conditions.is_empty() {
            return ("".to_string(), Vec::new());
        }

        let mut values = Vec::new();
        let mut param_counter = 1;

        let conditions_sql = conditions
            .iter()
            .map(|condition| Self::build_condition_sql(condition, &mut values, &mut param_counter))
            .collect::<Vec<_>>()
            .join(" AND ");

        (format!("WHERE {}", conditions_sql), values)
    }

    fn build_condition_sql(
        filter: &QueryFilter,
        values: &mut Vec<Value>,
        param_counter: &mut i32,
    ) -> String {
        match filter {
            QueryFilter::Condition(condition) => {
                Self::build_single_condition_sql(condition, values, param_counter)
            }
            QueryFilter::Group { operator, filters } => {
                if filters.is_empty() {
                    return match operator {
                        LogicalOperator::And => "1=1".to_string(),
                        LogicalOperator::Or => "1=0".to_string(),
                    };
                }

                let operator_str = match operator {
                    LogicalOperator::And => " AND ",
                    LogicalOperator::Or => " OR ",
                };

                let group_conditions = filters
                    .iter()
                    .map(|f| Self::build_condition_sql(f, values, param_counter))
                    .collect::<Vec<_>>()
                    .join(operator_str);

                format!("({})", group_conditions)
            }
        }
    }

    fn push_param(value: &Value, values: &mut Vec<Value>, param_counter: &mut i32) -> String {
        values.push(value.clone());
        let param = format!("${}", param_counter);
        *param_counter += 1;
        param
    }

    fn build_single_condition_sql(
        condition: &QueryCondition,
        values: &mut Vec<Value>,
        param_counter: &mut i32,
    ) -> String {
        let field = &condition.field;

        let comparison = match &condition.operator {
            QueryOperator::Eq => "=",
            QueryOperator::Ne => "!=",
            QueryOperator::Gt => ">",
            QueryOperator::Gte => ">=",
            QueryOperator::Lt => "<",
            QueryOperator::Lte => "<=",
            QueryOperator::Like => "LIKE",
            QueryOperator::ILike => "ILIKE",
            QueryOperator::In | QueryOperator::NotIn => {
                let negated = condition.operator == QueryOperator::NotIn;
                return match &condition.value {
                    Some(Value::Array(array_values)) if !array_values.is_empty() => {
                        let placeholders: Vec<String> = array_values
                            .iter()
                            .map(|value| Self::push_param(value, values, param_counter))
                            .collect();
                        let keyword = if negated { "NOT IN" } else { "IN" };
                        format!("{} {} ({})", field, keyword, placeholders.join(", "))
                    }
                    // Empty IN matches nothing, empty NOT IN everything
                    _ if negated => "1=1".to_string(),
                    _ => "1=0".to_string(),
                };
            }
            QueryOperator::IsNull => return format!("{} IS NULL", field),
            QueryOperator::IsNotNull => return format!("{} IS NOT NULL", field),
        };

        match (&condition.operator, &condition.value) {
            (_, Some(value)) => {
                let param = Self::push_param(value, values, param_counter);
                format!("{} {} {}", field, comparison, param)
            }
            (QueryOperator::Eq, None) => format!("{} IS NULL", field),
            (QueryOperator::Ne, None) => format!("{} IS NOT NULL", field),
            // Invalid condition
            _ => "1=0".to_string(),
        }
    }

    /// Build ORDER BY clause
    pub fn build_order_clause(order_by: &[(String, SortOrder)]) -> String {
        if order_by.is_empty() {
            return "".to_string();
        }

        let order_items: Vec<String> = order_by
            .iter()
            .map(|(field, order)| format!("{} {}", field, order.to_sql()))
            .collect();

        format!("ORDER BY {}", order_items.join(", "))
    }

    /// Build LIMIT/OFFSET clause
    pub fn build_limit_clause(limit: Option<i64>, offset: Option<i64>) -> String {
        let mut clauses = Vec::new();

        if let Some(limit) = limit {
            clauses.push(format!("LIMIT {}", limit));
        }

        if let Some(offset) = offset {
            clauses.push(format!("OFFSET {}", offset));
        }

        clauses.join(" ")
    }

    /// Correlated sub-select producing one JSON column per included relation
    ///
    /// Never SQL NULL: a missing single relation reads as JSON `null`, a missing
    /// collection as `[]`.
    pub fn build_include_column(table: &str, relation: &Relation) -> String {
        let source = format!(
            "FROM {} r WHERE r.{} = {}.{}",
            relation.table, relation.foreign_key, table, relation.local_key
        );
        match relation.kind {
            RelationKind::One => format!(
                "COALESCE((SELECT to_jsonb(r) {} LIMIT 1), 'null'::jsonb) AS {}",
                source, relation.path
            ),
            RelationKind::Many => format!(
                "COALESCE((SELECT jsonb_agg(r) {}), '[]'::jsonb) AS {}",
                source, relation.path
            ),
        }
    }

    /// Aggregate over one column, rendered as a single JSON value named `value`
    ///
    /// `SUM` of no rows reads as zero, the other functions as NULL.
    pub fn build_aggregate_expression(function: AggregateFunction, field: &str) -> String {
        match function {
            AggregateFunction::Sum => format!("to_jsonb(COALESCE(SUM({}), 0)) AS value", field),
            AggregateFunction::Count => format!("to_jsonb(COUNT({})) AS value", field),
            other => format!("to_jsonb({}({})) AS value", other.to_sql(), field),
        }
    }
}
