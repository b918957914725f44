//! Paging types
//!
//! List endpoints return one page wrapped in [`PageResult`] inside the
//! standard envelope.

use serde::{Deserialize, Serialize};

/// Default page size when the caller omits `pageSize`
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on `pageSize`
pub const MAX_PAGE_SIZE: u32 = 100;

/// Normalized paging window (1-based page)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    /// Clamp raw query values: page >= 1, 1 <= page_size <= [`MAX_PAGE_SIZE`]
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        Self { page, page_size }
    }

    /// SQL LIMIT
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// SQL OFFSET
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> PageResult<T> {
    pub fn new(list: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            list,
            total,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }
}
