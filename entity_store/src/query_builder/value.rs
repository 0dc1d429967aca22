//! JSON value semantics used when filters are evaluated outside a database

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A persisted row in its serde representation: column name to value
pub type JsonRow = Map<String, Value>;

fn as_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Equality the way a database compares typed columns: numbers by value,
/// timestamps by instant, everything else structurally.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_)) => {
            compare_values(left, right) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}

/// Ordering between two scalars of the same kind; `None` when they are not comparable
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
        },
        (Value::String(a), Value::String(b)) => match (as_timestamp(a), as_timestamp(b)) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => Some(a.cmp(b)),
        },
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Sort comparison with NULLs after every value, as Postgres does for ascending order
pub fn compare_nulls_last(left: &Value, right: &Value) -> Ordering {
    match (left.is_null(), right.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare_values(left, right).unwrap_or(Ordering::Equal),
    }
}

/// SQL LIKE matching: `%` matches any run, `_` one character, `\` escapes the next one
pub fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let fold = |s: &str| -> Vec<char> {
        if case_insensitive {
            s.to_lowercase().chars().collect()
        } else {
            s.chars().collect()
        }
    };
    let text = fold(text);
    let pattern = fold(pattern);

    #[derive(Clone, Copy, PartialEq)]
    enum Token {
        Any,
        One,
        Literal(char),
    }

    let mut tokens = Vec::with_capacity(pattern.len());
    let mut chars = pattern.into_iter();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => Token::Any,
            '_' => Token::One,
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            other => Token::Literal(other),
        });
    }

    // matched[j]: the first i text chars match the first j tokens
    let mut matched = vec![false; tokens.len() + 1];
    matched[0] = true;
    for (j, token) in tokens.iter().enumerate() {
        matched[j + 1] = matched[j] && *token == Token::Any;
    }

    for c in &text {
        let mut next = vec![false; tokens.len() + 1];
        for (j, token) in tokens.iter().enumerate() {
            next[j + 1] = match token {
                Token::Any => next[j] || matched[j + 1],
                Token::One => matched[j],
                Token::Literal(l) => matched[j] && l == c,
            };
        }
        matched = next;
    }

    matched[tokens.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_like_match() {
        assert!(like_match("widget", "wid%", false));
        assert!(like_match("widget", "%dge%", false));
        assert!(like_match("widget", "w_dget", false));
        assert!(!like_match("widget", "W%", false));
        assert!(like_match("widget", "W%", true));
        assert!(like_match("", "%", false));
        assert!(!like_match("", "_", false));
        assert!(like_match("100%", "100\\%", false));
        assert!(!like_match("1000", "100\\%", false));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert_eq!(compare_values(&json!(2), &json!(10)), Some(Ordering::Less));
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Some(Ordering::Greater));
    }

    #[test]
    fn test_timestamps_compare_by_instant() {
        let whole = json!("2024-01-01T00:00:01Z");
        let fractional = json!("2024-01-01T00:00:00.500Z");
        assert_eq!(compare_values(&whole, &fractional), Some(Ordering::Greater));
        assert!(values_equal(
            &json!("2024-01-01T00:00:00Z"),
            &json!("2024-01-01T02:00:00+02:00")
        ));
    }

    #[test]
    fn test_nulls_sort_last() {
        assert_eq!(compare_nulls_last(&Value::Null, &json!(1)), Ordering::Greater);
        assert_eq!(compare_nulls_last(&json!(1), &Value::Null), Ordering::Less);
        assert_eq!(compare_nulls_last(&json!("a"), &json!("b")), Ordering::Less);
    }

    #[test]
    fn test_mixed_kinds_are_not_comparable() {
        assert_eq!(compare_values(&json!(1), &json!("1")), None);
        assert!(!values_equal(&json!(1), &json!("1")));
    }
}
