//! Shared fixtures for repository integration tests

#![allow(dead_code)]

use entity_derive::entity;
use entity_store::prelude::*;

#[entity(table = "categories")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[entity(table = "products")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub category_id: Option<Uuid>,

    #[include(table = "categories", local = "category_id", foreign = "id")]
    pub category: Option<Category>,

    #[include(table = "reviews", local = "id", foreign = "product_id", many)]
    pub reviews: Vec<Review>,
}

#[entity(table = "reviews")]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub rating: i32,
}

pub fn product(name: &str, price: f64) -> Product {
    Product::new(Uuid::new_v4(), name.to_string(), price, 10, None)
}

pub fn product_repo(store: &MemoryStore) -> Repository<Product, MemoryStore> {
    Repository::new(store.clone())
}

/// Add products in order, returning what the store handed back
pub async fn seed(repo: &Repository<Product, MemoryStore>, items: &[(&str, f64)]) -> Vec<Product> {
    let mut added = Vec::with_capacity(items.len());
    for (name, price) in items {
        added.push(repo.add(product(name, *price)).await.unwrap());
    }
    added
}

pub fn names(products: &[Product]) -> Vec<String> {
    products.iter().map(|p| p.name.clone()).collect()
}
