//! Pagination request/response types.

use serde::{Deserialize, Serialize};

/// A request for one page of results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
}

impl PageRequest {
    /// Number of rows to fetch.
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1) * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 25,
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Items in this page.
    pub items: Vec<T>,
    /// Current page (1-based).
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
    /// Total item count across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Assemble a page response, deriving `total_pages`.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self {
            items,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        let page = PageRequest {
            page: 3,
            page_size: 25,
        };
        assert_eq!(page.offset(), 50);
        assert_eq!(page.limit(), 25);

        let first = PageRequest {
            page: 0,
            page_size: 10,
        };
        assert_eq!(first.offset(), 0);
    }

    #[test]
    fn test_total_pages() {
        let resp = PageResponse::new(vec![1, 2, 3], 1, 25, 51);
        assert_eq!(resp.total_pages, 3);

        let empty: PageResponse<i32> = PageResponse::new(vec![], 1, 25, 0);
        assert_eq!(empty.total_pages, 0);
    }
}
