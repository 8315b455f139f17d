//! Pagination request and normalized list page.
//!
//! Every list endpoint is reduced to one shape, [`Page`], regardless of which
//! envelope the backend used. Page numbers are 1-based.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`PageRequest`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// Page numbers start at 1.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A page must hold at least one item.
    #[error("limit must be greater than 0")]
    ZeroLimit,
}

/// A validated `(page, limit)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page size used by the dashboard tables.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Create a page request.
    ///
    /// # Errors
    ///
    /// Returns an error if `page` or `limit` is zero.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::ZeroPage);
        }
        if limit == 0 {
            return Err(PageError::ZeroLimit);
        }
        Ok(Self { page, limit })
    }

    /// First page with the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if `limit` is zero.
    pub const fn first(limit: u32) -> Result<Self, PageError> {
        Self::new(1, limit)
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// The request for the following page, same size.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of a server-filtered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page, in server order.
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total: u64,
    /// Current page, clamped into `1..=max(total_pages, 1)`.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Build a page from a `{items, total}` style response.
    ///
    /// `page_size` of zero is treated as one so that page arithmetic stays
    /// defined.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let mut built = Self {
            items,
            total,
            page,
            page_size,
        };
        built.page = page.clamp(1, built.total_pages().max(1));
        built
    }

    /// Build a page from a `{items, currentPage, totalPages}` style response.
    ///
    /// These responses carry no item count, so `total` is reconstructed as
    /// the smallest count that still yields `total_pages` pages. On the last
    /// page the reconstruction is exact.
    #[must_use]
    pub fn from_page_count(items: Vec<T>, current_page: u32, total_pages: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        let total = if total_pages == 0 {
            items.len() as u64
        } else {
            let full_pages = u64::from(total_pages - 1) * u64::from(page_size);
            let last_page_len = if current_page >= total_pages {
                (items.len() as u64).max(1)
            } else {
                1
            };
            full_pages + last_page_len
        };
        Self::new(items, total, current_page, page_size)
    }

    /// Wrap an unpaginated list (bare JSON array) as a single page.
    #[must_use]
    pub fn single(items: Vec<T>) -> Self {
        let len = items.len();
        let page_size = u32::try_from(len).unwrap_or(u32::MAX).max(1);
        Self::new(items, len as u64, 1, page_size)
    }

    /// Number of pages, `ceil(total / page_size)`.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.page_size.max(1)));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items while keeping the pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_page_request_rejects_zero() {
        assert_eq!(PageRequest::new(0, 10), Err(PageError::ZeroPage));
        assert_eq!(PageRequest::new(1, 0), Err(PageError::ZeroLimit));
        assert_eq!(PageRequest::new(3, 6).unwrap().next().page(), 4);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let page = Page::new(vec![0; 10], 25, 1, 10);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_empty_result_has_one_virtual_page() {
        let page: Page<u8> = Page::new(vec![], 0, 4, 10);
        assert_eq!(page.total_pages(), 0);
        assert_eq!(page.page, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_clamped_to_last() {
        let page: Page<u8> = Page::new(vec![], 25, 9, 10);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_from_page_count_last_page_is_exact() {
        let page = Page::from_page_count(vec![1, 2, 3], 3, 3, 10);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_from_page_count_middle_page() {
        let page = Page::from_page_count(vec![0; 10], 1, 4, 10);
        assert_eq!(page.total_pages(), 4);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_single() {
        let page = Page::single(vec!["a", "b"]);
        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages(), 1);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 12, 2, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 12);
        assert_eq!(page.page, 2);
    }

    proptest! {
        #[test]
        fn prop_total_pages_is_ceiling(total in 0u64..100_000, limit in 1u32..500, page in 0u32..1_000) {
            let built: Page<()> = Page::new(vec![], total, page, limit);
            let expected = total.div_ceil(u64::from(limit));
            prop_assert_eq!(u64::from(built.total_pages()), expected);
            prop_assert!(built.page >= 1);
            prop_assert!(built.page <= built.total_pages().max(1));
        }

        #[test]
        fn prop_page_count_roundtrips(total_pages in 1u32..1_000, current in 1u32..1_000, limit in 1u32..100) {
            let built: Page<()> = Page::from_page_count(vec![], current, total_pages, limit);
            prop_assert_eq!(built.total_pages(), total_pages);
            prop_assert!(built.page <= total_pages);
        }
    }
}
