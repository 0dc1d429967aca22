use super::Repository;
use crate::errors::RepositoryError;
use crate::traits::{Entity, EntityStore};

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    /// Batched insert; returns how many entities were submitted
    pub async fn bulk_insert(&self, entities: &[T]) -> Result<usize, RepositoryError> {
        crate::debug_log!(entity = T::entity_name(), count = entities.len(), "bulk_insert");
        self.store.bulk_insert(entities).await?;
        Ok(entities.len())
    }

    /// Batched update by primary key; returns how many entities were submitted
    pub async fn bulk_update(&self, entities: &[T]) -> Result<usize, RepositoryError> {
        crate::debug_log!(entity = T::entity_name(), count = entities.len(), "bulk_update");
        self.store.bulk_update(entities).await?;
        Ok(entities.len())
    }
}
