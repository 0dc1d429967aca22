//! Reads and the add/update writes

use super::{EntityQuery, Repository};
use crate::errors::RepositoryError;
use crate::query_builder::{Includes, OrderBy, QueryBuilder, QueryFilter};
use crate::traits::{Entity, EntityStore, StoreTransaction};
use chrono::Utc;

impl<T: Entity, S: EntityStore<T>> Repository<T, S> {
    /// Active entity with this id; inactive and missing both read as `None`
    pub async fn get_by_id(&self, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let query = QueryBuilder::new()
            .filter(Self::id_filter(id)?)
            .filter(Self::active_filter());
        self.store.fetch_optional(&query).await
    }

    /// The whole collection, active or not
    pub fn query(&self) -> EntityQuery<'_, T, S> {
        EntityQuery::new(&self.store, QueryBuilder::new())
    }

    /// All active entities
    pub fn get_all(&self) -> EntityQuery<'_, T, S> {
        self.query().filter(Self::active_filter())
    }

    /// Active entities narrowed by `filter`, with `includes` expanded and sorted by `order_by`
    pub fn get_all_with(
        &self,
        filter: Option<QueryFilter>,
        order_by: Option<&OrderBy>,
        includes: Option<&Includes>,
    ) -> EntityQuery<'_, T, S> {
        let mut query = self.get_all();
        if let Some(filter) = filter {
            query = query.filter(filter);
        }
        if let Some(includes) = includes {
            query = query.includes(includes);
        }
        if let Some(order_by) = order_by {
            query = query.ordered(order_by);
        }
        query
    }

    /// Active entities matching `filter`
    pub fn find(&self, filter: QueryFilter) -> EntityQuery<'_, T, S> {
        self.get_all().filter(filter)
    }

    /// Persist a new entity, stamping `created_at`
    pub async fn add(&self, mut entity: T) -> Result<T, RepositoryError> {
        entity.audit_mut().created_at = Utc::now();
        tracing::info!(entity = T::entity_name(), id = ?entity.id(), "Adding entity");

        self.transactional("add", |tx| Box::pin(async move { tx.insert(&entity).await }))
            .await
            .inspect_err(|e| {
                tracing::error!(entity = T::entity_name(), error = %e, "Error adding entity");
            })
    }

    /// Persist the full entity state, stamping `modified_at`; last writer wins
    ///
    /// `created_at` and `created_by` keep their stored values whatever the entity carries.
    pub async fn update(&self, mut entity: T) -> Result<T, RepositoryError> {
        entity.audit_mut().modified_at = Some(Utc::now());
        tracing::info!(entity = T::entity_name(), id = ?entity.id(), "Updating entity");

        self.transactional("update", |tx| Box::pin(async move { tx.update(&entity).await }))
            .await
            .inspect_err(|e| {
                tracing::error!(entity = T::entity_name(), error = %e, "Error updating entity");
            })
    }
}
