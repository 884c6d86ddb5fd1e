//! Offset pagination for list queries.

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: u64 = 100;

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u64,
    /// Rows per page, within `1..=MAX_PAGE_SIZE`.
    pub page_size: u64,
}

impl PageRequest {
    /// Builds a window, clamping both values into range.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Rows to take.
    pub fn limit(&self) -> u64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Direction of an ordered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
}

impl<T> PageResponse<T> {
    /// Wraps `items` fetched for `page` out of `total_items` rows.
    pub fn new(items: Vec<T>, page: u64, page_size: u64, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(page_size.max(1)).max(1);
        Self {
            items,
            page,
            page_size,
            total_items,
            total_pages,
            has_next: page < total_pages,
        }
    }

    /// Converts every item, keeping the totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_is_clamped() {
        let req = PageRequest::new(0, 1000);
        assert_eq!(req, PageRequest { page: 1, page_size: MAX_PAGE_SIZE });
        assert_eq!(req.offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_page_counts() {
        let resp = PageResponse::new(vec![1, 2], 2, 2, 5);
        assert_eq!(resp.total_pages, 3);
        assert!(resp.has_next);

        let empty: PageResponse<u8> = PageResponse::new(vec![], 1, 20, 0);
        assert_eq!(empty.total_pages, 1);
        assert!(!empty.has_next);
    }

    #[test]
    fn test_map_keeps_totals() {
        let resp = PageResponse::new(vec![1, 2], 1, 2, 3).map(|n| n * 10);
        assert_eq!(resp.items, vec![10, 20]);
        assert_eq!(resp.total_items, 3);
        assert!(resp.has_next);
    }

    #[test]
    fn test_sort_order_parses_lowercase() {
        let order: SortOrder = serde_json::from_str("\"asc\"").expect("parse");
        assert_eq!(order.as_sql(), "ASC");
        assert_eq!(SortOrder::default(), SortOrder::Desc);
    }
}
