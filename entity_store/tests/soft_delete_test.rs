//! Integration tests for the soft-delete / restore lifecycle

mod common;

use common::*;
use entity_store::prelude::*;

#[tokio::test]
async fn test_soft_delete_hides_entity_from_active_reads() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let added = repo.add(product("Widget", 9.5)).await.unwrap();
    let actor = Uuid::new_v4();

    let deleted = repo.soft_delete(added.clone(), actor).await.unwrap();
    assert!(!deleted.audit.is_active);
    assert!(deleted.audit.deleted_at.is_some());
    assert_eq!(deleted.audit.deleted_by, Some(actor));

    assert!(repo.get_by_id(&added.id).await.unwrap().is_none());
    assert!(!repo.exists(&added.id).await.unwrap());
    // The row itself is kept
    assert_eq!(store.row_count::<Product>().await, 1);
    assert_eq!(repo.count(QueryFilter::eq("is_active", json!(false))).await.unwrap(), 1);
}

#[tokio::test]
async fn test_restore_reverses_soft_delete() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let added = repo.add(product("Widget", 9.5)).await.unwrap();

    let deleted = repo.soft_delete(added, Uuid::new_v4()).await.unwrap();
    let deleted_at = deleted.audit.deleted_at.unwrap();

    let restored = repo.restore(deleted).await.unwrap();
    assert!(restored.audit.is_active);
    assert!(restored.audit.deleted_at.is_none());
    assert!(restored.audit.deleted_by.is_none());
    assert!(restored.audit.modified_at.unwrap() >= deleted_at);

    let fetched = repo.get_by_id(&restored.id).await.unwrap().expect("restored entity");
    assert!(fetched.audit.is_active);
}

#[tokio::test]
async fn test_restore_is_noop_for_active_entities() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let added = repo.add(product("Widget", 9.5)).await.unwrap();

    let once = repo.restore(added.clone()).await.unwrap();
    assert!(once.audit.modified_at.is_none());

    let deleted = repo.soft_delete(added, Uuid::new_v4()).await.unwrap();
    let restored = repo.restore(deleted).await.unwrap();
    let again = repo.restore(restored.clone()).await.unwrap();
    assert_eq!(again.audit, restored.audit);
}

#[tokio::test]
async fn test_restore_does_not_touch_the_store_when_noop() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);

    // Never persisted: an update would fail with a missing row
    let detached = product("Detached", 1.0);
    let returned = repo.restore(detached.clone()).await.unwrap();
    assert_eq!(returned.id, detached.id);
    assert_eq!(store.row_count::<Product>().await, 0);
}

#[tokio::test]
async fn test_soft_delete_of_missing_row_fails_without_side_effects() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    repo.add(product("Kept", 1.0)).await.unwrap();

    assert!(repo.soft_delete(product("Ghost", 1.0), Uuid::new_v4()).await.is_err());
    assert_eq!(repo.get_all().count().await.unwrap(), 1);
}
