//! Infinite-scroll product feed.

use tracing::{debug, instrument};

use shopease_core::{PageRequest, ProductId};

use crate::api::ShopClient;
use crate::api::query::ListQuery;
use crate::api::types::Product;
use crate::error::Result;

/// Page size of the product browser.
pub const FEED_PAGE_SIZE: u32 = 6;

/// Position in an infinite-scroll list.
///
/// The cursor moves to the next page only after a page came back full. A
/// short or empty page means the list is exhausted, and the cursor stays
/// exhausted until [`ScrollCursor::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollCursor {
    next_page: u32,
    page_size: u32,
    exhausted: bool,
}

impl ScrollCursor {
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            next_page: 1,
            page_size: if page_size == 0 { 1 } else { page_size },
            exhausted: false,
        }
    }

    /// The page to fetch next, or `None` once exhausted.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.exhausted {
            return None;
        }
        PageRequest::new(self.next_page, self.page_size).ok()
    }

    /// Record how many items the last requested page returned.
    pub const fn advance(&mut self, received: usize) {
        if self.exhausted {
            return;
        }
        if received == self.page_size as usize {
            self.next_page = self.next_page.saturating_add(1);
        } else {
            self.exhausted = true;
        }
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    pub const fn reset(&mut self) {
        self.next_page = 1;
        self.exhausted = false;
    }
}

/// Accumulated product list for the browser view.
#[derive(Debug, Clone)]
pub struct ProductFeed {
    query: ListQuery,
    cursor: ScrollCursor,
    items: Vec<Product>,
}

impl ProductFeed {
    /// A feed over `query`, six products per page.
    #[must_use]
    pub fn new(query: ListQuery) -> Self {
        Self::with_page_size(query, FEED_PAGE_SIZE)
    }

    #[must_use]
    pub fn with_page_size(query: ListQuery, page_size: u32) -> Self {
        let cursor = ScrollCursor::new(page_size);
        Self {
            query,
            cursor,
            items: Vec::new(),
        }
    }

    /// Replace the filters. A change in filters clears the feed and starts
    /// again from page one; an identical query keeps what is loaded.
    pub fn set_query(&mut self, query: ListQuery) {
        if self.query.same_filters(&query) {
            return;
        }
        debug!("Feed filters changed, resetting");
        self.query = query;
        self.cursor.reset();
        self.items.clear();
    }

    /// Fetch the next page and append it.
    ///
    /// Returns the number of products appended; zero once exhausted.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; the cursor does not move.
    #[instrument(skip_all)]
    pub async fn load_more(&mut self, client: &ShopClient, token: Option<&str>) -> Result<usize> {
        let Some(page) = self.cursor.next_request() else {
            return Ok(0);
        };
        let query = self.query.clone().with_page(page);
        let loaded = client.list_products(&query, token).await?;
        let received = loaded.items.len();
        self.cursor.advance(received);
        self.items.extend(loaded.items);
        debug!(page = page.page(), received, total = self.items.len(), "Feed page loaded");
        Ok(received)
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Mutable access to one loaded product, for optimistic likes.
    pub fn product_mut(&mut self, id: &ProductId) -> Option<&mut Product> {
        self.items.iter_mut().find(|p| &p.id == id)
    }

    #[must_use]
    pub const fn has_more(&self) -> bool {
        !self.cursor.is_exhausted()
    }

    #[must_use]
    pub const fn query(&self) -> &ListQuery {
        &self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_advances_on_full_pages_only() {
        let mut cursor = ScrollCursor::new(6);
        assert_eq!(cursor.next_request().map(|p| p.page()), Some(1));

        cursor.advance(6);
        assert_eq!(cursor.next_request().map(|p| p.page()), Some(2));

        cursor.advance(4);
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next_request(), None);

        cursor.advance(6);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_cursor_empty_page_exhausts() {
        let mut cursor = ScrollCursor::new(6);
        cursor.advance(0);
        assert!(cursor.is_exhausted());
        cursor.reset();
        assert_eq!(cursor.next_request().map(|p| p.page()), Some(1));
    }

    #[test]
    fn test_zero_page_size_is_one() {
        assert_eq!(ScrollCursor::new(0).page_size(), 1);
    }

    #[test]
    fn test_set_query_resets_only_on_filter_change() {
        let mut feed = ProductFeed::new(ListQuery::default().search("tea"));
        feed.cursor.advance(6);
        feed.set_query(ListQuery::default().search(" tea "));
        assert_eq!(feed.cursor.next_request().map(|p| p.page()), Some(2));

        feed.set_query(ListQuery::default().search("coffee"));
        assert_eq!(feed.cursor.next_request().map(|p| p.page()), Some(1));
        assert!(feed.items().is_empty());
        assert!(feed.has_more());
    }
}
