//! Catalog listing, pagination and product maintenance against the fake
//! backend.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use chrono::{TimeZone, Utc};

use shopease_client::api::types::NewProduct;
use shopease_client::feed::ProductFeed;
use shopease_client::{ApiError, ListQuery, SortOrder};
use shopease_core::{Email, PageRequest, Price, ProductId};
use shopease_integration_tests::{FakeBackend, product_doc, review_doc};

async fn backend_with_products(count: u64) -> FakeBackend {
    let backend = FakeBackend::start().await;
    {
        let mut state = backend.state();
        for i in 0..count {
            // Likes deliberately out of id order
            let likes = (i * 7) % count;
            let price = 1.0 + f64::from(u32::try_from(i).unwrap()) / 2.0;
            state
                .products
                .push(product_doc(&format!("p-{i:02}"), &format!("Product {i}"), likes, price));
        }
    }
    backend
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_total_pages_and_page_bounds() {
    let backend = backend_with_products(23).await;
    let client = backend.client();

    for (page, expected_len) in [(1, 10), (2, 10), (3, 3)] {
        let query = ListQuery::new(PageRequest::new(page, 10).unwrap());
        let result = client.list_products(&query, None).await.unwrap();
        assert_eq!(result.total, 23);
        assert_eq!(result.total_pages(), 3);
        assert_eq!(result.page, page);
        assert_eq!(result.items.len(), expected_len);
    }

    // Past the end: no items, page clamped into range
    let query = ListQuery::new(PageRequest::new(9, 10).unwrap());
    let result = client.list_products(&query, None).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.page, 3);
    assert!(!result.has_next());
}

#[tokio::test]
async fn test_empty_catalog_has_one_page() {
    let backend = FakeBackend::start().await;
    let result = backend
        .client()
        .list_products(&ListQuery::default(), None)
        .await
        .unwrap();
    assert_eq!(result.total, 0);
    assert_eq!(result.total_pages(), 0);
    assert_eq!(result.page, 1);
}

#[tokio::test]
async fn test_page_count_envelope_is_normalized() {
    let backend = FakeBackend::start().await;
    {
        let mut state = backend.state();
        for i in 0..7 {
            state
                .reviews
                .push(review_doc(&format!("r-{i}"), "p-1", "a@shop.io", "Nice"));
        }
    }
    let client = backend.client();

    let middle = client.all_reviews(PageRequest::new(2, 3).unwrap()).await.unwrap();
    assert_eq!(middle.items.len(), 3);
    assert_eq!(middle.page, 2);
    assert_eq!(middle.total_pages(), 3);

    let last = client.all_reviews(PageRequest::new(3, 3).unwrap()).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.total, 7);
    assert!(!last.has_next());
}

#[tokio::test]
async fn test_pages_are_disjoint() {
    let backend = backend_with_products(25).await;
    let client = backend.client();

    let mut seen = HashSet::new();
    let mut query = ListQuery::new(PageRequest::first(4).unwrap()).sort_by_price(SortOrder::Asc);
    loop {
        let page = client.list_products(&query, None).await.unwrap();
        for product in &page.items {
            assert!(seen.insert(product.id.clone()), "duplicate {}", product.id);
        }
        if !page.has_next() {
            break;
        }
        query = query.next_page();
    }
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn test_feed_loads_until_exhausted() {
    let backend = backend_with_products(14).await;
    let client = backend.client();
    let mut feed = ProductFeed::new(ListQuery::default());

    assert_eq!(feed.load_more(&client, None).await.unwrap(), 6);
    assert_eq!(feed.load_more(&client, None).await.unwrap(), 6);
    assert_eq!(feed.load_more(&client, None).await.unwrap(), 2);
    assert!(!feed.has_more());
    assert_eq!(feed.load_more(&client, None).await.unwrap(), 0);
    assert_eq!(backend.hits("GET /products"), 3);

    let ids: HashSet<_> = feed.items().iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids.len(), 14);
}

// ============================================================================
// Sorting and filters
// ============================================================================

#[tokio::test]
async fn test_admin_table_sorted_by_likes() {
    let backend = backend_with_products(25).await;
    let query = ListQuery::new(PageRequest::first(10).unwrap()).sort_by("likes", SortOrder::Desc);

    let page = backend.client().all_products(&query).await.unwrap();

    assert_eq!(page.items.len(), 10);
    assert_eq!(page.total, 25);
    assert!(page.items.windows(2).all(|w| w[0].likes >= w[1].likes));
    assert_eq!(page.items[0].likes, 24);
}

#[tokio::test]
async fn test_filters_are_applied_server_side() {
    let backend = backend_with_products(10).await;
    let query = ListQuery::new(PageRequest::first(10).unwrap())
        .search("product 1")
        .category("All")
        .min_price(Price::parse("1.00").unwrap());

    let page = backend.client().list_products(&query, None).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Product 1");

    let query = ListQuery::new(PageRequest::first(10).unwrap())
        .max_price(Price::parse("2.00").unwrap())
        .sort_by_price(SortOrder::Desc);
    let page = backend.client().list_products(&query, None).await.unwrap();
    let prices: Vec<_> = page.items.iter().map(|p| p.price).collect();
    assert_eq!(prices.len(), 3);
    assert_eq!(prices[0], Price::parse("2").unwrap());
    assert_eq!(prices[2], Price::parse("1").unwrap());
}

// ============================================================================
// Add / delete
// ============================================================================

#[tokio::test]
async fn test_added_product_round_trips() {
    let backend = FakeBackend::start().await;
    let client = backend.client();
    let new_product = NewProduct {
        title: "Mango Chips".to_string(),
        category: "Snacks".to_string(),
        image: "https://img.test/mango.png".to_string(),
        ingredients: "mango, sunflower oil".to_string(),
        description: "Crunchy dried mango".to_string(),
        price: Price::parse("12.50").unwrap(),
        post_time: Some(Utc.with_ymd_and_hms(2025, 6, 1, 10, 30, 0).unwrap()),
        distributor_name: "Acme".to_string(),
        added_by_email: Email::parse("admin@shop.io").unwrap(),
    };

    let ack = client.add_product(&new_product).await.unwrap();
    let id = ProductId::new(ack.inserted_id.unwrap());

    let listed = client.list_products(&ListQuery::default(), None).await.unwrap();
    let product = listed.items.iter().find(|p| p.id == id).unwrap();
    assert_eq!(product.title, new_product.title);
    assert_eq!(product.category, new_product.category);
    assert_eq!(product.image, new_product.image);
    assert_eq!(product.ingredients, new_product.ingredients);
    assert_eq!(product.description, new_product.description);
    assert_eq!(product.price.amount(), new_product.price.amount());
    assert_eq!(product.post_time, new_product.post_time);
    assert_eq!(product.distributor_name.as_deref(), Some("Acme"));
    assert_eq!(product.added_by_email.as_deref(), Some("admin@shop.io"));
    assert_eq!(product.likes, 0);
}

#[tokio::test]
async fn test_blank_title_is_not_sent() {
    let backend = FakeBackend::start().await;
    let new_product = NewProduct {
        title: "   ".to_string(),
        category: "Snacks".to_string(),
        image: "https://img.test/x.png".to_string(),
        ingredients: "x".to_string(),
        description: "x".to_string(),
        price: Price::ZERO,
        post_time: None,
        distributor_name: "Acme".to_string(),
        added_by_email: Email::parse("admin@shop.io").unwrap(),
    };

    let err = backend.client().add_product(&new_product).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(backend.hits("POST /products"), 0);
}

#[tokio::test]
async fn test_delete_reflects_server_outcome() {
    let backend = backend_with_products(3).await;
    backend.refuse_deletion("p-01", "Only the owner can delete this product");
    let client = backend.client();
    let admin = Email::parse("other-admin@shop.io").unwrap();

    let mut table = client.all_products(&ListQuery::default()).await.unwrap().items;

    // Not owned by this admin, but the server allows it
    let allowed = ProductId::new("p-00");
    client.delete_product(&allowed, Some(&admin)).await.unwrap();
    table.retain(|p| p.id != allowed);
    assert_eq!(
        backend.state().last_admin_email.as_deref(),
        Some("other-admin@shop.io")
    );

    // Refused: stays in the table and the server's reason is shown
    let refused = ProductId::new("p-01");
    let err = client.delete_product(&refused, Some(&admin)).await.unwrap_err();
    assert_eq!(
        err.user_message("Failed to delete product"),
        "Only the owner can delete this product"
    );

    let server_ids: Vec<_> = client
        .all_products(&ListQuery::default())
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|p| p.id)
        .collect();
    let local_ids: Vec<_> = table.into_iter().map(|p| p.id).collect();
    assert_eq!(server_ids, local_ids);
    assert!(local_ids.contains(&refused));
}

#[tokio::test]
async fn test_missing_product_is_a_status_error() {
    let backend = FakeBackend::start().await;
    let err = backend
        .client()
        .product(&ProductId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert_eq!(err.user_message("fallback"), "Product not found");
}
