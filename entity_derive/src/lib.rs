//! Procedural macros for entity definitions
//!
//! This crate provides the `#[entity]` attribute macro, which turns a plain struct
//! into a persisted entity for `entity-store`.

use proc_macro::TokenStream;

mod entity_macro;
mod parsing;

/// Turn a struct into an entity
///
/// The macro appends an `audit: entity_store::AuditFields` field (flattened for both
/// serde and sqlx), derives `Debug`, `Clone`, `Serialize`, `Deserialize` and
/// `sqlx::FromRow`, implements `entity_store::Entity` and generates a `new`
/// constructor taking every stored field in declaration order.
///
/// Field attributes:
/// - `#[primary_key]` marks the identifier; without it a field named `id` is used.
/// - `#[include(table = "...", local = "...", foreign = "...")]` declares an include
///   path named after the field. Add `many` for one-to-many collections. Relation
///   fields are not columns; they are filled only when the path is included.
///
/// Usage:
/// ```rust,ignore
/// use entity_derive::entity;
///
/// #[entity(table = "products")]
/// pub struct Product {
///     pub id: Uuid,
///     pub name: String,
///     pub price: f64,
///     pub category_id: Option<Uuid>,
///
///     #[include(table = "categories", local = "category_id", foreign = "id")]
///     pub category: Option<Category>,
///
///     #[include(table = "reviews", local = "id", foreign = "product_id", many)]
///     pub reviews: Vec<Review>,
/// }
/// ```
#[proc_macro_attribute]
pub fn entity(attr: TokenStream, item: TokenStream) -> TokenStream {
    entity_macro::expand(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
