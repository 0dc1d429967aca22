//! Soft-delete state machine
//!
//! `active --soft_delete--> deleted --restore--> active`. Rows are never
//! physically removed here.

use super::Repository;
use crate::errors::RepositoryError;
use crate::traits::{ActorId, Entity, EntityStore, StoreTransaction};
use chrono::Utc;

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    /// Mark the entity deleted by `deleted_by` and persist it
    pub async fn soft_delete(&self, mut entity: T, deleted_by: ActorId) -> Result<T, RepositoryError> {
        entity.audit_mut().mark_deleted(Utc::now(), deleted_by);
        tracing::info!(
            entity = T::entity_name(),
            id = ?entity.id(),
            %deleted_by,
            "Soft deleting entity"
        );

        self.transactional("soft_delete", |tx| Box::pin(async move { tx.update(&entity).await }))
            .await
            .inspect_err(|e| {
                tracing::error!(entity = T::entity_name(), error = %e, "Error soft deleting entity");
            })
    }

    /// Reverse a soft delete
    ///
    /// Entities that were never deleted, or are already active, come back unchanged
    /// without touching the store.
    pub async fn restore(&self, mut entity: T) -> Result<T, RepositoryError> {
        if !entity.audit().is_deleted() || entity.is_active() {
            crate::debug_log!(entity = T::entity_name(), id = ?entity.id(), "restore is a no-op");
            return Ok(entity);
        }

        entity.audit_mut().clear_deleted(Utc::now());
        tracing::info!(entity = T::entity_name(), id = ?entity.id(), "Restoring entity");

        self.transactional("restore", |tx| Box::pin(async move { tx.update(&entity).await }))
            .await
            .inspect_err(|e| {
                tracing::error!(entity = T::entity_name(), error = %e, "Error restoring entity");
            })
    }
}
