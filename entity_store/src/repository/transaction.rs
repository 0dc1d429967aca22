//! Transactional session adapter
//!
//! Exactly one transaction scope per write call. The scope is committed only after
//! the unit of work succeeds and is rolled back on every failure path before the
//! failure is returned, so it is always released before control leaves the call.

use super::Repository;
use crate::errors::RepositoryError;
use crate::traits::{Entity, EntityStore, StoreTransaction};
use futures::future::BoxFuture;

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    /// Run `work` inside a fresh transaction scope
    ///
    /// # Example
    /// ```ignore
    /// let saved = repo
    ///     .transactional("reprice", |tx| Box::pin(async move {
    ///         let first = tx.update(&first).await?;
    ///         tx.update(&second).await?;
    ///         Ok(first)
    ///     }))
    ///     .await?;
    /// ```
    pub async fn transactional<R, F>(&self, operation: &'static str, work: F) -> Result<R, RepositoryError>
    where
        F: for<'a> FnOnce(&'a mut S::Transaction) -> BoxFuture<'a, Result<R, RepositoryError>>,
    {
        let mut tx = self.store.begin().await?;
        crate::trace_log!(entity = T::entity_name(), operation, "transaction started");

        match work(&mut tx).await {
            Ok(value) => {
                tx.commit().await?;
                crate::trace_log!(entity = T::entity_name(), operation, "transaction committed");
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::error!(
                        entity = T::entity_name(),
                        operation,
                        error = %rollback_error,
                        "Rollback failed"
                    );
                }
                Err(error)
            }
        }
    }
}
