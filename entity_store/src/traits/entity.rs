//! Entity model
//!
//! Every persisted record embeds [`AuditFields`] and implements [`Entity`].
//! The `#[entity]` attribute macro from `entity-derive` does both.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

/// Identifier of the actor performing a write
pub type ActorId = Uuid;

/// Column names contributed by [`AuditFields`], in declaration order
pub const AUDIT_COLUMNS: [&str; 8] = [
    "is_active",
    "created_at",
    "created_by",
    "modified_at",
    "modified_by",
    "deleted_at",
    "deleted_by",
    "version",
];

/// Audit columns written once by the insert and left alone by updates
pub(crate) const CREATION_COLUMNS: [&str; 2] = ["created_at", "created_by"];

/// Identity-independent attributes shared by all entities
///
/// `is_active == false` exactly when `deleted_at` is set, as long as the record
/// only changes through the repository lifecycle operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditFields {
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub created_by: ActorId,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<ActorId>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<ActorId>,
    /// Declared for optimistic concurrency; nothing increments or checks it yet.
    pub version: i32,
}

impl Default for AuditFields {
    fn default() -> Self {
        Self {
            is_active: true,
            created_at: Utc::now(),
            created_by: Uuid::nil(),
            modified_at: None,
            modified_by: None,
            deleted_at: None,
            deleted_by: None,
            version: 0,
        }
    }
}

impl AuditFields {
    /// Fresh audit fields attributed to `actor`
    pub fn attributed_to(actor: ActorId) -> Self {
        Self {
            created_by: actor,
            ..Self::default()
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) fn mark_deleted(&mut self, at: DateTime<Utc>, by: ActorId) {
        self.deleted_at = Some(at);
        self.deleted_by = Some(by);
        self.is_active = false;
    }

    pub(crate) fn clear_deleted(&mut self, at: DateTime<Utc>) {
        self.deleted_at = None;
        self.deleted_by = None;
        self.is_active = true;
        self.modified_at = Some(at);
    }
}

/// Cardinality of a named include path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `local_key` on this entity points at `foreign_key` on the related row
    One,
    /// Rows of `table` whose `foreign_key` equals this entity's `local_key`
    Many,
}

/// Metadata behind an include path: the field `path` receives the related row(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    pub path: &'static str,
    pub table: &'static str,
    pub local_key: &'static str,
    pub foreign_key: &'static str,
    pub kind: RelationKind,
}

/// A persisted record type
pub trait Entity:
    Clone + Send + Sync + Debug + Serialize + DeserializeOwned + Unpin + 'static
{
    /// Identifier type, immutable after creation
    type Id: Clone + Send + Sync + Debug + PartialEq + Serialize + DeserializeOwned;

    /// Type name, used to scope cache keys
    fn entity_name() -> &'static str;

    /// Backing table
    fn table_name() -> &'static str;

    /// Primary key column
    fn primary_key() -> &'static str {
        "id"
    }

    /// Persisted columns, audit columns included, relation fields excluded
    fn columns() -> &'static [&'static str];

    /// Include paths this entity can expand
    fn relations() -> &'static [Relation] {
        &[]
    }

    fn relation(path: &str) -> Option<&'static Relation> {
        Self::relations().iter().find(|relation| relation.path == path)
    }

    fn id(&self) -> &Self::Id;

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;

    fn is_active(&self) -> bool {
        self.audit().is_active
    }
}
