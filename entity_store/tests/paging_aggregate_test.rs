//! Integration tests for paging, counting and aggregates

mod common;

use common::*;
use entity_store::prelude::*;
use entity_store::RepositoryError;

async fn seed_numbered(repo: &Repository<Product, MemoryStore>, count: usize) -> Vec<Product> {
    let mut added = Vec::with_capacity(count);
    for i in 1..=count {
        added.push(
            repo.add(product(&format!("item-{:02}", i), i as f64))
                .await
                .unwrap(),
        );
    }
    added
}

fn everything() -> QueryFilter {
    QueryFilter::and(vec![])
}

#[tokio::test]
async fn test_second_page_of_twenty_five() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    seed_numbered(&repo, 25).await;

    let page = repo.get_paged(everything(), 2, 10).await.unwrap();
    assert_eq!(page.total_count, 25);
    assert_eq!(
        names(&page.items),
        (11..=20).map(|i| format!("item-{:02}", i)).collect::<Vec<_>>()
    );

    let last = repo.get_paged(everything(), 3, 10).await.unwrap();
    assert_eq!(last.total_count, 25);
    assert_eq!(last.items.len(), 5);

    let beyond = repo.get_paged(everything(), 4, 10).await.unwrap();
    assert_eq!(beyond.total_count, 25);
    assert!(beyond.items.is_empty());
}

#[tokio::test]
async fn test_paging_counts_inactive_rows() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let added = seed_numbered(&repo, 5).await;
    repo.soft_delete(added[0].clone(), Uuid::new_v4()).await.unwrap();

    let page = repo.get_paged(everything(), 1, 10).await.unwrap();
    assert_eq!(page.total_count, 5);
    assert_eq!(page.items.len(), 5);
    assert_eq!(repo.count(everything()).await.unwrap(), 5);
    assert_eq!(repo.get_all().count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_ordered_paging_through_query() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    seed_numbered(&repo, 12).await;

    let page = repo
        .get_all()
        .order_by("price", SortOrder::Desc)
        .paged(1, 3)
        .await
        .unwrap();
    assert_eq!(page.total_count, 12);
    assert_eq!(names(&page.items), vec!["item-12", "item-11", "item-10"]);
}

#[tokio::test]
async fn test_invalid_page_arguments() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);

    for (page, size) in [(0, 10), (1, 0)] {
        let err = repo.get_paged(everything(), page, size).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { .. }));
    }
}

#[tokio::test]
async fn test_aggregates_cover_whole_collection() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let added = seed(&repo, &[("a", 2.0), ("b", 4.0), ("c", 9.0)]).await;
    repo.soft_delete(added[2].clone(), Uuid::new_v4()).await.unwrap();

    assert_eq!(repo.max::<f64>("price").await.unwrap(), Some(9.0));
    assert_eq!(repo.min::<f64>("price").await.unwrap(), Some(2.0));
    assert_eq!(repo.sum("price").await.unwrap(), 15.0);
    assert_eq!(repo.average("price").await.unwrap(), Some(5.0));
    assert_eq!(repo.max::<String>("name").await.unwrap(), Some("c".to_string()));
    assert_eq!(repo.sum("stock").await.unwrap(), 30.0);
}

#[tokio::test]
async fn test_aggregates_on_empty_collection() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);

    assert_eq!(repo.max::<f64>("price").await.unwrap(), None);
    assert_eq!(repo.min::<f64>("price").await.unwrap(), None);
    assert_eq!(repo.sum("price").await.unwrap(), 0.0);
    assert_eq!(repo.average("price").await.unwrap(), None);
}

#[tokio::test]
async fn test_aggregate_selector_is_validated() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);

    for field in ["price; DROP TABLE products", "colour", ""] {
        let err = repo.max::<f64>(field).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation { .. }), "{}", field);
    }
}
