//! Like checks and optimistic updates against the fake backend.

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use serde_json::json;

use shopease_client::ApiError;
use shopease_client::api::types::UpcomingProduct;
use shopease_client::identity::Identity;
use shopease_client::likes::{LikeRejection, like_product, like_upcoming};
use shopease_core::{Badge, Email, ProductId};
use shopease_integration_tests::{FakeBackend, product_doc};

const PRODUCT_LIKE: &str = "PATCH /products/{id}/like";
const UPCOMING_LIKE: &str = "PATCH /upcoming-products/{id}/like";

fn identity(email: &str) -> Identity {
    Identity::new(
        "uid",
        Email::parse(email).unwrap(),
        format!("token-{email}"),
        "refresh",
        Utc::now() + Duration::hours(1),
    )
}

async fn backend_with_upcoming() -> FakeBackend {
    let backend = FakeBackend::start().await;
    let mut doc = product_doc("u-1", "Dragon Fruit Jam", 3, 8.5);
    doc["publishDate"] = json!("2026-12-01T09:00");
    doc["likedBy"] = json!(["a@shop.io", "b@shop.io", "c@shop.io"]);
    backend.state().upcoming.push(doc);
    backend
}

async fn first_upcoming(backend: &FakeBackend) -> UpcomingProduct {
    let mut upcoming = backend.client().upcoming_products(None).await.unwrap();
    upcoming.items.remove(0)
}

#[tokio::test]
async fn test_product_like_is_sent_once() {
    let backend = FakeBackend::start().await;
    backend.state().products.push(product_doc("p-1", "Tea", 0, 4.0));
    let client = backend.client();
    let me = identity("me@shop.io");

    let mut product = client.product(&ProductId::new("p-1")).await.unwrap();
    like_product(&client, &mut product, Some(&me)).await.unwrap();
    assert_eq!(product.likes, 1);
    assert_eq!(product.liked_by, vec!["me@shop.io".to_string()]);
    assert_eq!(backend.hits(PRODUCT_LIKE), 1);

    // Repeated attempts are refused before sending
    for _ in 0..3 {
        let err = like_product(&client, &mut product, Some(&me)).await.unwrap_err();
        assert!(matches!(err, ApiError::Like(LikeRejection::AlreadyLiked)));
    }
    assert_eq!(backend.hits(PRODUCT_LIKE), 1);
    assert_eq!(product.likes, 1);

    // Fresh copy from the server agrees
    let refreshed = client.product(&ProductId::new("p-1")).await.unwrap();
    assert_eq!(refreshed.likes, 1);
    assert!(refreshed.is_liked_by(&me.email));
}

#[tokio::test]
async fn test_signed_out_like_sends_nothing() {
    let backend = FakeBackend::start().await;
    backend.state().products.push(product_doc("p-1", "Tea", 0, 4.0));
    let client = backend.client();

    let mut product = client.product(&ProductId::new("p-1")).await.unwrap();
    let err = like_product(&client, &mut product, None).await.unwrap_err();
    assert_eq!(err.user_message("fallback"), "Please login to like products");
    assert_eq!(backend.hits(PRODUCT_LIKE), 0);
}

#[tokio::test]
async fn test_bronze_upcoming_like_is_blocked_locally() {
    let backend = backend_with_upcoming().await;
    let client = backend.client();
    let me = identity("bronze@shop.io");
    let mut upcoming = first_upcoming(&backend).await;
    let before = upcoming.clone();

    let err = like_upcoming(&client, &mut upcoming, Some(&me), Badge::Bronze)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Like(LikeRejection::PremiumRequired)));
    assert_eq!(upcoming, before);
    assert_eq!(backend.hits(UPCOMING_LIKE), 0);
}

#[tokio::test]
async fn test_gold_upcoming_like_increments_by_one() {
    let backend = backend_with_upcoming().await;
    let client = backend.client();
    let me = identity("gold@shop.io");
    let mut upcoming = first_upcoming(&backend).await;
    assert_eq!(upcoming.product.likes, 3);
    assert!(upcoming.publish_date.is_some());

    like_upcoming(&client, &mut upcoming, Some(&me), Badge::Gold)
        .await
        .unwrap();

    assert_eq!(upcoming.product.likes, 4);
    assert!(upcoming.product.is_liked_by(&me.email));
    assert_eq!(backend.hits(UPCOMING_LIKE), 1);
    assert_eq!(first_upcoming(&backend).await.product.likes, 4);
}

#[tokio::test]
async fn test_failed_like_rolls_back() {
    let backend = backend_with_upcoming().await;
    backend.fail_likes();
    let client = backend.client();
    let me = identity("gold@shop.io");
    let mut upcoming = first_upcoming(&backend).await;
    let before = upcoming.clone();

    let err = like_upcoming(&client, &mut upcoming, Some(&me), Badge::Platinum)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(upcoming, before);
    assert_eq!(backend.hits(UPCOMING_LIKE), 1);
}
