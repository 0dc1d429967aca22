use crate::query_builder::sql_generation::SqlGenerator;
use crate::query_builder::{
    AggregateFunction, Includes, JsonRow, OrderBy, Pagination, QueryBuilder, QueryFilter,
    SortOrder,
};
use crate::traits::{Relation, RelationKind};
use serde_json::json;

fn row(value: serde_json::Value) -> JsonRow {
    value.as_object().cloned().unwrap()
}

// ========================================
// SQL generation
// ========================================

#[test]
fn test_where_clause_numbers_parameters_in_order() {
    let query = QueryBuilder::new()
        .filter(QueryFilter::eq("is_active", json!(true)))
        .filter(QueryFilter::or(vec![
            QueryFilter::gt("price", json!(10)),
            QueryFilter::in_values("category", vec![json!("a"), json!("b")]),
        ]));

    let (where_clause, values) = query.build_where_clause();
    assert_eq!(
        where_clause,
        "WHERE is_active = $1 AND (price > $2 OR category IN ($3, $4))"
    );
    assert_eq!(values, vec![json!(true), json!(10), json!("a"), json!("b")]);
}

#[test]
fn test_empty_query_has_no_clauses() {
    let (where_clause, order_clause, limit_clause, values) = QueryBuilder::new().build();
    assert!(where_clause.is_empty());
    assert!(order_clause.is_empty());
    assert!(limit_clause.is_empty());
    assert!(values.is_empty());
}

#[test]
fn test_null_and_empty_set_conditions() {
    let query = QueryBuilder::new()
        .filter(QueryFilter::is_null("deleted_at"))
        .filter(QueryFilter::in_values("status", vec![]))
        .filter(QueryFilter::not_in_values("kind", vec![]))
        .filter(QueryFilter::or(vec![]))
        .filter(QueryFilter::and(vec![]));

    let (where_clause, values) = query.build_where_clause();
    assert_eq!(
        where_clause,
        "WHERE deleted_at IS NULL AND 1=0 AND 1=1 AND 1=0 AND 1=1"
    );
    assert!(values.is_empty());
}

#[test]
fn test_order_and_limit_clauses() {
    let query = QueryBuilder::new()
        .ordered(&OrderBy::desc("price").then_asc("name"))
        .limit(10)
        .offset(20);

    assert_eq!(query.build_order_clause(), "ORDER BY price DESC, name ASC");
    assert_eq!(query.build_limit_clause(), "LIMIT 10 OFFSET 20");
}

#[test]
fn test_include_columns() {
    let one = Relation {
        path: "category",
        table: "categories",
        local_key: "category_id",
        foreign_key: "id",
        kind: RelationKind::One,
    };
    let many = Relation {
        path: "reviews",
        table: "reviews",
        local_key: "id",
        foreign_key: "product_id",
        kind: RelationKind::Many,
    };

    assert_eq!(
        SqlGenerator::build_include_column("products", &one),
        "COALESCE((SELECT to_jsonb(r) FROM categories r WHERE r.id = products.category_id LIMIT 1), 'null'::jsonb) AS category"
    );
    assert_eq!(
        SqlGenerator::build_include_column("products", &many),
        "COALESCE((SELECT jsonb_agg(r) FROM reviews r WHERE r.product_id = products.id), '[]'::jsonb) AS reviews"
    );
}

#[test]
fn test_aggregate_expressions() {
    assert_eq!(
        SqlGenerator::build_aggregate_expression(AggregateFunction::Sum, "price"),
        "to_jsonb(COALESCE(SUM(price), 0)) AS value"
    );
    assert_eq!(
        SqlGenerator::build_aggregate_expression(AggregateFunction::Max, "price"),
        "to_jsonb(MAX(price)) AS value"
    );
}

// ========================================
// In-memory evaluation
// ========================================

#[test]
fn test_evaluate_comparisons() {
    let product = row(json!({"name": "Widget", "price": 12.5, "stock": 3, "note": null}));

    assert!(QueryFilter::eq("name", json!("Widget")).evaluate(&product));
    assert!(QueryFilter::gt("price", json!(10)).evaluate(&product));
    assert!(QueryFilter::lte("stock", json!(3)).evaluate(&product));
    assert!(QueryFilter::ilike("name", "wid%").evaluate(&product));
    assert!(!QueryFilter::like("name", "wid%").evaluate(&product));
    assert!(QueryFilter::in_values("stock", vec![json!(1), json!(3)]).evaluate(&product));
    assert!(QueryFilter::not_in_values("stock", vec![]).evaluate(&product));
    assert!(!QueryFilter::in_values("stock", vec![]).evaluate(&product));
}

#[test]
fn test_evaluate_null_semantics() {
    let product = row(json!({"name": "Widget", "note": null}));

    assert!(QueryFilter::is_null("note").evaluate(&product));
    assert!(QueryFilter::is_null("missing").evaluate(&product));
    assert!(QueryFilter::is_not_null("name").evaluate(&product));
    // Comparisons against NULL never hold, in either direction
    assert!(!QueryFilter::eq("note", json!("x")).evaluate(&product));
    assert!(!QueryFilter::ne("note", json!("x")).evaluate(&product));
    assert!(!QueryFilter::eq("name", json!(null)).evaluate(&product));
    assert!(!QueryFilter::not_in_values("note", vec![json!("x")]).evaluate(&product));
}

#[test]
fn test_evaluate_groups() {
    let product = row(json!({"price": 5, "category": "tools"}));

    let cheap_or_food = QueryFilter::or(vec![
        QueryFilter::lt("price", json!(10)),
        QueryFilter::eq("category", json!("food")),
    ]);
    assert!(cheap_or_food.evaluate(&product));
    assert!(QueryFilter::and(vec![]).evaluate(&product));
    assert!(!QueryFilter::or(vec![]).evaluate(&product));

    let query = QueryBuilder::new()
        .filter(cheap_or_food)
        .filter(QueryFilter::eq("category", json!("food")));
    assert!(!query.matches(&product));
}

#[test]
fn test_and_also_flattens() {
    let combined = QueryFilter::eq("a", json!(1))
        .and_also(QueryFilter::eq("b", json!(2)))
        .and_also(QueryFilter::eq("c", json!(3)));

    match combined {
        QueryFilter::Group { filters, .. } => assert_eq!(filters.len(), 3),
        other => panic!("Expected AND group, got {:?}", other),
    }
}

// ========================================
// Builder helpers
// ========================================

#[test]
fn test_includes_parse_drops_empty_segments() {
    let includes = Includes::parse("category, ,reviews,,");
    assert_eq!(includes.paths(), &["category".to_string(), "reviews".to_string()]);
    assert!(Includes::parse("").is_empty());
}

#[test]
fn test_pagination_window() {
    assert_eq!(
        Pagination::for_page(2, 10),
        Some(Pagination {
            limit: 10,
            offset: 10
        })
    );
    assert_eq!(Pagination::for_page(0, 10), None);
    assert_eq!(Pagination::for_page(1, 0), None);
}

#[test]
fn test_fingerprint_tracks_query_shape() {
    let base = QueryBuilder::new().filter(QueryFilter::eq("price", json!(1)));
    let same = QueryBuilder::new().filter(QueryFilter::eq("price", json!(1)));
    let other = QueryBuilder::new().filter(QueryFilter::eq("price", json!(2)));

    assert_eq!(base.fingerprint(), same.fingerprint());
    assert_ne!(base.fingerprint(), other.fingerprint());
    assert_ne!(
        base.fingerprint(),
        base.clone().order_by("price", SortOrder::Asc).fingerprint()
    );
}

#[test]
fn test_referenced_fields_and_filters_only() {
    let query = QueryBuilder::new()
        .filter(QueryFilter::or(vec![
            QueryFilter::eq("a", json!(1)),
            QueryFilter::is_null("b"),
        ]))
        .order_by("c", SortOrder::Desc)
        .include("category")
        .limit(5);

    assert_eq!(query.referenced_fields(), vec!["a", "b", "c"]);

    let counted = query.filters_only();
    assert_eq!(counted.conditions().len(), 1);
    assert!(counted.ordering().is_empty());
    assert!(counted.include_paths().is_empty());
    assert_eq!(counted.window(), (None, None));
}
