//! Basic repository usage against the in-process store
//!
//! Run with: cargo run --example basic_usage

use repohaus::prelude::*;
use std::sync::Arc;

#[entity(table = "authors")]
pub struct Author {
    pub id: Uuid,
    pub name: String,
}

#[entity(table = "books")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub pages: i32,
    pub author_id: Option<Uuid>,

    #[include(table = "authors", local = "author_id", foreign = "id")]
    pub author: Option<Author>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let cache = Arc::new(CacheManager::in_memory());

    let authors: Repository<Author, _> = Repository::new(store.clone());
    let books: Repository<Book, _> = Repository::new(store.clone()).with_cache_manager(cache);

    println!("=== Adding rows ===");
    let ursula = authors
        .add(Author::new(Uuid::new_v4(), "Ursula".to_string()))
        .await?;
    for (title, pages) in [("Lathe", 184), ("Wizard", 205), ("Dispossessed", 387)] {
        let book = books
            .add(Book::new(Uuid::new_v4(), title.to_string(), pages, Some(ursula.id)))
            .await?;
        println!("added {} ({} pages)", book.title, book.pages);
    }

    println!("\n=== Filtering with includes ===");
    let long_books = books
        .find(QueryFilter::gt("pages", json!(200)))
        .order_by("pages", SortOrder::Desc)
        .include("author")
        .fetch_all()
        .await?;
    for book in &long_books {
        let author = book.author.as_ref().map(|a| a.name.as_str()).unwrap_or("-");
        println!("{} by {}", book.title, author);
    }

    println!("\n=== Soft delete ===");
    let first = long_books
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("expected at least one long book"))?;
    let deleted = books.soft_delete(first, Uuid::new_v4()).await?;
    println!("active books: {}", books.get_all().count().await?);
    books.restore(deleted).await?;
    println!("after restore: {}", books.get_all().count().await?);

    println!("\n=== Paging and aggregates ===");
    let page = books.get_paged(QueryFilter::gt("pages", json!(0)), 1, 2).await?;
    println!("page 1: {} of {}", page.items.len(), page.total_count);
    println!("total pages: {}", books.sum("pages").await?);
    println!("average: {:?}", books.average("pages").await?);

    println!("\n=== Cached reads ===");
    let cached = books.get_all_with_cache(None, None, None).await?;
    println!("cached {} books", cached.len());
    books.invalidate_cache().await?;

    Ok(())
}
