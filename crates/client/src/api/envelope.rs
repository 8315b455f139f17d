//! Adapters from the backend's list envelopes to [`Page`].
//!
//! The backend answers list endpoints with several shapes:
//!
//! - `{ "<plural>": [...], "total": n }` (products, users, serve queue)
//! - `{ "<plural>": [...], "currentPage": p, "totalPages": n }` (reviews,
//!   a user's requests)
//! - a bare JSON array (upcoming products, reviews of one product)
//!
//! Each shape gets a serde struct and an [`Envelope`] impl; callers only ever
//! see `Page<T>`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use shopease_core::{Page, PageRequest};

use super::types::{Product, ProductRequest, Review, User};

/// A list response that can be normalized into a [`Page`].
pub trait Envelope: DeserializeOwned {
    type Item;

    /// Normalize, using `request` for anything the envelope leaves out.
    fn into_page(self, request: PageRequest) -> Page<Self::Item>;
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

// =============================================================================
// {<plural>, total}
// =============================================================================

macro_rules! total_envelope {
    ($name:ident, $field:ident, $item:ty) => {
        #[derive(Debug, Deserialize)]
        pub struct $name {
            #[serde(default)]
            pub $field: Vec<$item>,
            #[serde(default)]
            pub total: Option<u64>,
        }

        impl Envelope for $name {
            type Item = $item;

            fn into_page(self, request: PageRequest) -> Page<$item> {
                let total = self.total.unwrap_or_else(|| count(self.$field.len()));
                Page::new(self.$field, total, request.page(), request.limit())
            }
        }
    };
}

total_envelope!(ProductsEnvelope, products, Product);
total_envelope!(UsersEnvelope, users, User);
total_envelope!(RequestsEnvelope, requests, ProductRequest);

// =============================================================================
// {<plural>, currentPage, totalPages}
// =============================================================================

macro_rules! page_count_envelope {
    ($name:ident, $field:ident, $item:ty) => {
        #[derive(Debug, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default)]
            pub $field: Vec<$item>,
            #[serde(default)]
            pub current_page: Option<u32>,
            #[serde(default)]
            pub total_pages: Option<u32>,
        }

        impl Envelope for $name {
            type Item = $item;

            fn into_page(self, request: PageRequest) -> Page<$item> {
                let current = self.current_page.unwrap_or_else(|| request.page());
                let total_pages = self.total_pages.unwrap_or(current);
                Page::from_page_count(self.$field, current, total_pages, request.limit())
            }
        }
    };
}

page_count_envelope!(PagedReviews, reviews, Review);
page_count_envelope!(PagedRequests, requests, ProductRequest);

// =============================================================================
// Bare arrays
// =============================================================================

impl<T: DeserializeOwned> Envelope for Vec<T> {
    type Item = T;

    fn into_page(self, _request: PageRequest) -> Page<T> {
        Page::single(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product(id: &str) -> serde_json::Value {
        json!({"_id": id, "title": id, "price": 1})
    }

    #[test]
    fn test_products_envelope() {
        let body = json!({
            "products": [product("a"), product("b")],
            "total": 25
        });
        let envelope: ProductsEnvelope = serde_json::from_value(body).unwrap();
        let page = envelope.into_page(PageRequest::new(3, 10).unwrap());
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages(), 3);
        assert!(!page.has_next());
    }

    #[test]
    fn test_missing_total_uses_item_count() {
        let envelope: UsersEnvelope =
            serde_json::from_value(json!({"users": [{"email": "a@x.io"}]})).unwrap();
        let page = envelope.into_page(PageRequest::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages(), 1);
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let envelope: ProductsEnvelope =
            serde_json::from_value(json!({"products": [], "total": 12})).unwrap();
        let page = envelope.into_page(PageRequest::new(9, 10).unwrap());
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_page_count_envelope_roundtrips_total_pages() {
        let body = json!({
            "reviews": [
                {"_id": "r1", "comment": "a"},
                {"_id": "r2", "comment": "b"}
            ],
            "currentPage": 1,
            "totalPages": 4
        });
        let envelope: PagedReviews = serde_json::from_value(body).unwrap();
        let page = envelope.into_page(PageRequest::new(1, 10).unwrap());
        assert_eq!(page.total_pages(), 4);
        assert_eq!(page.page, 1);
        assert!(page.has_next());
    }

    #[test]
    fn test_page_count_envelope_last_page_is_exact() {
        let body = json!({
            "requests": [{"_id": "q1", "productId": "p1"}],
            "currentPage": 2,
            "totalPages": 2
        });
        let envelope: PagedRequests = serde_json::from_value(body).unwrap();
        let page = envelope.into_page(PageRequest::new(2, 10).unwrap());
        assert_eq!(page.total, 11);
        assert!(!page.has_next());
    }

    #[test]
    fn test_bare_array_is_single_page() {
        let items: Vec<Review> =
            serde_json::from_value(json!([{"_id": "r1"}, {"_id": "r2"}, {"_id": "r3"}])).unwrap();
        let page = items.into_page(PageRequest::default());
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_previous());
    }

    #[test]
    fn test_empty_bare_array() {
        let page = Vec::<Review>::new().into_page(PageRequest::default());
        assert!(page.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages(), 0);
    }
}
