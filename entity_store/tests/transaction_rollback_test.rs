//! Integration tests for the transactional envelope around writes
//!
//! `FlakyStore` delegates to a `MemoryStore` but its transactions can be told to
//! fail after the write has already landed in the transaction.

mod common;

use async_trait::async_trait;
use common::*;
use entity_store::prelude::*;
use entity_store::query_builder::AggregateFunction;
use entity_store::{MemoryTransaction, RepositoryError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
    fail_rollback: Arc<AtomicBool>,
}

struct FlakyTransaction {
    inner: MemoryTransaction<Product>,
    fail_writes: bool,
    fail_rollback: bool,
}

impl FlakyTransaction {
    fn injected(operation: &'static str) -> RepositoryError {
        RepositoryError::store("products", operation, "injected failure")
    }
}

#[async_trait]
impl StoreTransaction<Product> for FlakyTransaction {
    async fn insert(&mut self, entity: &Product) -> Result<Product, RepositoryError> {
        let inserted = self.inner.insert(entity).await?;
        if self.fail_writes {
            return Err(Self::injected("insert"));
        }
        Ok(inserted)
    }

    async fn update(&mut self, entity: &Product) -> Result<Product, RepositoryError> {
        let updated = self.inner.update(entity).await?;
        if self.fail_writes {
            return Err(Self::injected("update"));
        }
        Ok(updated)
    }

    async fn commit(self) -> Result<(), RepositoryError> {
        self.inner.commit().await
    }

    async fn rollback(self) -> Result<(), RepositoryError> {
        self.inner.rollback().await?;
        if self.fail_rollback {
            return Err(Self::injected("rollback"));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Product> for FlakyStore {
    type Transaction = FlakyTransaction;

    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn begin(&self) -> Result<FlakyTransaction, RepositoryError> {
        Ok(FlakyTransaction {
            inner: EntityStore::<Product>::begin(&self.inner).await?,
            fail_writes: self.fail_writes.load(Ordering::SeqCst),
            fail_rollback: self.fail_rollback.load(Ordering::SeqCst),
        })
    }

    async fn fetch_all(&self, query: &QueryBuilder) -> Result<Vec<Product>, RepositoryError> {
        EntityStore::<Product>::fetch_all(&self.inner, query).await
    }

    async fn count(&self, query: &QueryBuilder) -> Result<i64, RepositoryError> {
        EntityStore::<Product>::count(&self.inner, query).await
    }

    async fn aggregate(
        &self,
        function: AggregateFunction,
        field: &ValidatedFieldName,
    ) -> Result<Value, RepositoryError> {
        EntityStore::<Product>::aggregate(&self.inner, function, field).await
    }

    async fn execute_raw(&self, sql: &str, params: Vec<Value>) -> Result<u64, RepositoryError> {
        EntityStore::<Product>::execute_raw(&self.inner, sql, params).await
    }

    async fn bulk_insert(&self, entities: &[Product]) -> Result<(), RepositoryError> {
        EntityStore::<Product>::bulk_insert(&self.inner, entities).await
    }

    async fn bulk_update(&self, entities: &[Product]) -> Result<(), RepositoryError> {
        EntityStore::<Product>::bulk_update(&self.inner, entities).await
    }
}

fn flaky_repo() -> (FlakyStore, Repository<Product, FlakyStore>) {
    let store = FlakyStore::default();
    (store.clone(), Repository::new(store))
}

#[tokio::test]
async fn test_failed_update_rolls_back() {
    let (store, repo) = flaky_repo();
    let added = repo.add(product("Widget", 9.5)).await.unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    let mut changed = added.clone();
    changed.price = 99.0;
    let err = repo.update(changed).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Store { operation: "update", .. }));

    let fetched = repo.get_by_id(&added.id).await.unwrap().unwrap();
    assert_eq!(fetched.price, 9.5);
    assert!(fetched.audit.modified_at.is_none());
}

#[tokio::test]
async fn test_failed_add_leaves_nothing_behind() {
    let (store, repo) = flaky_repo();
    store.fail_writes.store(true, Ordering::SeqCst);

    assert!(repo.add(product("Widget", 9.5)).await.is_err());
    assert_eq!(store.inner.row_count::<Product>().await, 0);
}

#[tokio::test]
async fn test_soft_delete_and_restore_roll_back() {
    let (store, repo) = flaky_repo();
    let added = repo.add(product("Widget", 9.5)).await.unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    assert!(repo.soft_delete(added.clone(), Uuid::new_v4()).await.is_err());
    assert!(repo.get_by_id(&added.id).await.unwrap().is_some());

    store.fail_writes.store(false, Ordering::SeqCst);
    let deleted = repo.soft_delete(added.clone(), Uuid::new_v4()).await.unwrap();

    store.fail_writes.store(true, Ordering::SeqCst);
    assert!(repo.restore(deleted).await.is_err());
    assert!(repo.get_by_id(&added.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_rollback_failure_keeps_original_error() {
    let (store, repo) = flaky_repo();
    store.fail_writes.store(true, Ordering::SeqCst);
    store.fail_rollback.store(true, Ordering::SeqCst);

    let err = repo.add(product("Widget", 9.5)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Store { operation: "insert", .. }));
}

#[tokio::test]
async fn test_scope_is_released_after_failure() {
    let (store, repo) = flaky_repo();
    store.fail_writes.store(true, Ordering::SeqCst);
    assert!(repo.add(product("first", 1.0)).await.is_err());

    store.fail_writes.store(false, Ordering::SeqCst);
    let next = tokio::time::timeout(Duration::from_secs(5), repo.add(product("second", 2.0)))
        .await
        .expect("writer lock released");
    assert!(next.is_ok());
}

#[tokio::test]
async fn test_duplicate_key_is_a_store_failure() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let added = repo.add(product("Widget", 9.5)).await.unwrap();

    let err = repo.add(added).await.unwrap_err();
    assert!(err.is_store_failure());
    assert_eq!(store.row_count::<Product>().await, 1);
}

#[tokio::test]
async fn test_transactional_groups_writes() {
    let store = MemoryStore::new();
    let repo = product_repo(&store);
    let first = product("first", 1.0);
    let second = product("second", 2.0);

    let result = repo
        .transactional("pair", |tx| {
            Box::pin(async move {
                tx.insert(&first).await?;
                tx.insert(&second).await?;
                tx.insert(&first).await
            })
        })
        .await;

    assert!(result.is_err());
    assert_eq!(store.row_count::<Product>().await, 0);
}
