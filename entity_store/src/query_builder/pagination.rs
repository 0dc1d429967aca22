//! Paging

use serde::{Deserialize, Serialize};

/// One page of results
///
/// `total_count` is the number of matches at query time, independent of how many
/// items the page holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub total_count: i64,
    pub items: Vec<T>,
}

/// Pagination configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    /// Window for a 1-based page number; `None` unless `page >= 1` and `page_size > 0`
    pub fn for_page(page: u32, page_size: u32) -> Option<Self> {
        if page == 0 || page_size == 0 {
            return None;
        }
        Some(Self {
            limit: i64::from(page_size),
            offset: (i64::from(page) - 1) * i64::from(page_size),
        })
    }
}
