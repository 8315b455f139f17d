//! Integration test support for the ShopEase client.
//!
//! [`FakeBackend`] runs an in-memory imitation of the ShopEase REST API on
//! `127.0.0.1:0` so the client can be exercised end to end without network
//! access. It speaks the same envelopes as the real backend and counts every
//! request by route, which lets tests assert that an operation sent nothing.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopease-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - product listing, pagination, add/delete
//! - `likes` - like checks and optimistic updates
//! - `access` - role resolution and gates
//! - `accounts` - session, reviews, requests, checkout, image upload

use std::cmp::Ordering;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use axum::extract::{MatchedPath, Multipart, Path, Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shopease_client::ShopClient;
use shopease_client::config::{ApiConfig, ImageHostConfig};
use shopease_client::identity::{
    FederatedCredential, FederatedToken, Identity, IdentityError, IdentityProvider, ProfileUpdate,
};
use shopease_core::Email;

/// API key the fake image host accepts.
pub const IMAGE_HOST_KEY: &str = "test-image-key";

type Shared = Arc<Mutex<BackendState>>;
type Params = Query<HashMap<String, String>>;

/// Everything the fake backend stores. Documents are raw JSON so tests can
/// seed legacy shapes as easily as current ones.
#[derive(Debug, Default)]
pub struct BackendState {
    pub products: Vec<Value>,
    pub upcoming: Vec<Value>,
    pub users: Vec<Value>,
    pub reviews: Vec<Value>,
    pub requests: Vec<Value>,
    pub payments: Vec<Value>,
    /// Amounts (in cents) of created payment intents.
    pub intent_amounts: Vec<i64>,
    /// Value of `x-admin-email` on the last deletion.
    pub last_admin_email: Option<String>,
    refused_deletions: HashMap<String, String>,
    failing_likes: bool,
    hits: HashMap<String, usize>,
    next_id: u64,
}

impl BackendState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// A running fake backend. Dropping it stops the server.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Shared::default();
        let app = router(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local address");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Fake backend stopped: {e}");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A client pointed at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> ShopClient {
        let config = ApiConfig::new(&self.base_url()).expect("Invalid fake backend URL");
        ShopClient::new(&config).expect("Failed to build client")
    }

    /// Image host settings pointing at this backend's `/upload`.
    #[must_use]
    pub fn image_host_config(&self) -> ImageHostConfig {
        let mut config = ImageHostConfig::new(IMAGE_HOST_KEY.to_string());
        config.upload_url = format!("{}/upload", self.base_url());
        config
    }

    /// Lock the stored state for seeding or inspection.
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        lock(&self.state)
    }

    /// Number of requests received for a route, e.g.
    /// `"PATCH /products/{id}/like"`.
    #[must_use]
    pub fn hits(&self, route: &str) -> usize {
        self.state().hits.get(route).copied().unwrap_or(0)
    }

    /// Answer deletions of `id` with 403 and `message`.
    pub fn refuse_deletion(&self, id: &str, message: &str) {
        self.state()
            .refused_deletions
            .insert(id.to_string(), message.to_string());
    }

    /// Make every like endpoint answer 500.
    pub fn fail_likes(&self) {
        self.state().failing_likes = true;
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn lock(state: &Shared) -> MutexGuard<'_, BackendState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Seed documents
// =============================================================================

/// A catalog product document.
#[must_use]
pub fn product_doc(id: &str, title: &str, likes: u64, price: f64) -> Value {
    json!({
        "_id": id,
        "title": title,
        "category": "Snacks",
        "image": format!("https://img.test/{id}.png"),
        "description": format!("{title} description"),
        "ingredients": "sugar, salt",
        "price": price,
        "postTime": "2025-06-01T10:30:00.000Z",
        "distributorName": "Acme",
        "addedByEmail": "owner@shop.io",
        "likes": likes,
        "likedBy": [],
        "reviewCount": 0,
        "rating": 0
    })
}

/// A user document.
#[must_use]
pub fn user_doc(id: &str, email: &str, role: &str, badge: &str) -> Value {
    json!({
        "_id": id,
        "email": email,
        "displayName": email.split('@').next().unwrap_or(email),
        "role": role,
        "badge": badge,
        "createdAt": "2025-01-01T00:00:00.000Z"
    })
}

/// A review document.
#[must_use]
pub fn review_doc(id: &str, product_id: &str, email: &str, comment: &str) -> Value {
    json!({
        "_id": id,
        "ProductId": product_id,
        "userEmail": email,
        "userName": email.split('@').next().unwrap_or(email),
        "comment": comment,
        "likes": 0,
        "createdAt": "2025-06-02T08:00:00.000Z"
    })
}

/// A pending product request document.
#[must_use]
pub fn request_doc(id: &str, product_id: &str, email: &str) -> Value {
    json!({
        "_id": id,
        "productId": product_id,
        "productTitle": format!("Product {product_id}"),
        "userEmail": email,
        "userName": email.split('@').next().unwrap_or(email),
        "status": "pending",
        "requestedAt": "2025-06-03T09:00:00.000Z"
    })
}

// =============================================================================
// Router
// =============================================================================

fn router(state: Shared) -> Router {
    Router::new()
        .route("/products", get(list_products).post(add_product))
        .route("/all-products", get(all_products))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/like", patch(like_product))
        .route("/upcoming-products", get(list_upcoming))
        .route("/upcoming-products/publish", post(publish_upcoming))
        .route("/upcoming-products/{id}/like", patch(like_upcoming))
        .route("/users", get(list_users))
        .route("/users/upsert", post(upsert_user))
        .route("/users/{key}", get(get_user))
        .route("/users/{key}/make-admin", patch(make_admin))
        .route("/reviews", post(add_review))
        .route("/reviews/{id}", get(product_reviews))
        .route("/all-reviews", get(all_reviews))
        .route("/my-reviews/{email}", get(my_reviews))
        .route("/product-requests", post(add_request))
        .route("/serve-products", get(serve_queue))
        .route("/serve-products/{id}/serve", put(serve_request))
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/payments/save", post(save_payment))
        .route("/payments/{email}", get(payment_history))
        .route("/upload", post(upload_image))
        .route_layer(middleware::from_fn_with_state(Arc::clone(&state), record_hit))
        .with_state(state)
}

async fn record_hit(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());
    let key = format!("{} {route}", request.method());
    *lock(&state).hits.entry(key).or_default() += 1;
    next.run(request).await
}

// =============================================================================
// Helpers
// =============================================================================

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn ack() -> Response {
    Json(json!({ "success": true })).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
}

fn str_field<'a>(doc: &'a Value, field: &str) -> &'a str {
    doc.get(field).and_then(Value::as_str).unwrap_or_default()
}

fn number_param(params: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    params
        .get(key)
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Slice `items` by `page` and `limit`, returning the slice, the total, the
/// page and the limit.
fn paginate(items: Vec<Value>, params: &HashMap<String, String>) -> (Vec<Value>, u64, u64, u64) {
    let page = number_param(params, "page", 1);
    let limit = number_param(params, "limit", 10);
    let total = items.len() as u64;
    let skip = usize::try_from((page - 1) * limit).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    let slice = items.into_iter().skip(skip).take(take).collect();
    (slice, total, page, limit)
}

fn page_count_body(field: &str, items: Vec<Value>, params: &HashMap<String, String>) -> Value {
    let (slice, total, page, limit) = paginate(items, params);
    let mut body = Map::new();
    body.insert(field.to_string(), Value::Array(slice));
    body.insert("currentPage".to_string(), json!(page));
    body.insert("totalPages".to_string(), json!(total.div_ceil(limit)));
    Value::Object(body)
}

fn compare_field(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => x.as_str().cmp(&y.as_str()),
        },
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

fn sort_by_field(items: &mut [Value], field: &str, order: &str) {
    items.sort_by(|a, b| {
        let ordering = compare_field(a, b, field);
        if order.eq_ignore_ascii_case("desc") {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn matches_filters(product: &Value, params: &HashMap<String, String>) -> bool {
    if let Some(search) = params.get("search") {
        let title = str_field(product, "title").to_lowercase();
        if !title.contains(&search.to_lowercase()) {
            return false;
        }
    }
    if let Some(category) = params.get("category")
        && str_field(product, "category") != category
    {
        return false;
    }
    let price = product.get("price").and_then(Value::as_f64).unwrap_or(0.0);
    let below_min = params
        .get("minPrice")
        .and_then(|v| v.parse::<f64>().ok())
        .is_some_and(|min| price < min);
    let above_max = params
        .get("maxPrice")
        .and_then(|v| v.parse::<f64>().ok())
        .is_some_and(|max| price > max);
    !below_min && !above_max
}

/// Record a like on `doc`, refusing duplicates.
fn apply_like(doc: &mut Value, email: &str) -> Result<(), &'static str> {
    let Some(doc) = doc.as_object_mut() else {
        return Err("Invalid document");
    };
    let liked_by = doc
        .entry("likedBy")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or("Invalid likedBy")?;
    if liked_by.iter().any(|e| e.as_str() == Some(email)) {
        return Err("You already liked this product");
    }
    liked_by.push(json!(email));
    let likes = doc.get("likes").and_then(Value::as_u64).unwrap_or(0);
    doc.insert("likes".to_string(), json!(likes + 1));
    Ok(())
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(state): State<Shared>, Query(params): Params) -> Json<Value> {
    let state = lock(&state);
    let mut items: Vec<Value> = state
        .products
        .iter()
        .filter(|p| matches_filters(p, &params))
        .cloned()
        .collect();
    if let Some(order) = params.get("sortByPrice") {
        sort_by_field(&mut items, "price", order);
    }
    let (products, total, _, _) = paginate(items, &params);
    Json(json!({ "products": products, "total": total }))
}

async fn all_products(State(state): State<Shared>, Query(params): Params) -> Json<Value> {
    let mut items = lock(&state).products.clone();
    if let Some(field) = params.get("sortBy") {
        let order = params.get("order").map_or("asc", String::as_str);
        sort_by_field(&mut items, field, order);
    }
    let (products, total, _, _) = paginate(items, &params);
    Json(json!({ "products": products, "total": total }))
}

async fn get_product(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    lock(&state)
        .products
        .iter()
        .find(|p| str_field(p, "_id") == id)
        .map_or_else(
            || message(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p.clone()).into_response(),
        )
}

async fn add_product(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let id = state.next_id("p");
    if let Some(doc) = body.as_object_mut() {
        doc.insert("_id".to_string(), json!(id));
        doc.entry("likes").or_insert(json!(0));
        doc.entry("likedBy").or_insert_with(|| json!([]));
    }
    state.products.push(body);
    (
        StatusCode::CREATED,
        Json(json!({ "success": true, "insertedId": id })),
    )
        .into_response()
}

async fn update_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let Some(product) = state.products.iter_mut().find(|p| str_field(p, "_id") == id) else {
        return message(StatusCode::NOT_FOUND, "Product not found");
    };
    if let (Some(doc), Some(update)) = (product.as_object_mut(), body.as_object()) {
        for (key, value) in update {
            doc.insert(key.clone(), value.clone());
        }
    }
    ack()
}

async fn delete_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut state = lock(&state);
    state.last_admin_email = headers
        .get("x-admin-email")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(reason) = state.refused_deletions.get(&id) {
        return message(StatusCode::FORBIDDEN, &reason.clone());
    }
    let before = state.products.len();
    state.products.retain(|p| str_field(p, "_id") != id);
    if state.products.len() == before {
        return message(StatusCode::NOT_FOUND, "Product not found");
    }
    Json(json!({ "success": true, "message": "Product deleted" })).into_response()
}

async fn like_product(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    if state.failing_likes {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Like failed");
    }
    let email = str_field(&body, "userEmail").to_string();
    let Some(product) = state.products.iter_mut().find(|p| str_field(p, "_id") == id) else {
        return message(StatusCode::NOT_FOUND, "Product not found");
    };
    match apply_like(product, &email) {
        Ok(()) => ack(),
        Err(reason) => message(StatusCode::BAD_REQUEST, reason),
    }
}

// =============================================================================
// Upcoming products
// =============================================================================

async fn list_upcoming(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(lock(&state).upcoming.clone()))
}

async fn publish_upcoming(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let id = str_field(&body, "productId").to_string();
    let admin = str_field(&body, "addedByEmail").to_string();
    let mut state = lock(&state);
    let Some(index) = state.upcoming.iter().position(|p| str_field(p, "_id") == id) else {
        return message(StatusCode::NOT_FOUND, "Upcoming product not found");
    };
    let mut product = state.upcoming.remove(index);
    if let Some(doc) = product.as_object_mut() {
        doc.remove("publishDate");
        doc.insert("addedByEmail".to_string(), json!(admin));
    }
    state.products.push(product);
    ack()
}

async fn like_upcoming(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized access");
    }
    let mut state = lock(&state);
    if state.failing_likes {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "Like failed");
    }
    let email = str_field(&body, "userEmail").to_string();
    let Some(product) = state.upcoming.iter_mut().find(|p| str_field(p, "_id") == id) else {
        return message(StatusCode::NOT_FOUND, "Upcoming product not found");
    };
    match apply_like(product, &email) {
        Ok(()) => ack(),
        Err(reason) => message(StatusCode::BAD_REQUEST, reason),
    }
}

// =============================================================================
// Users
// =============================================================================

async fn list_users(State(state): State<Shared>, Query(params): Params) -> Json<Value> {
    let search = params.get("search").map(|s| s.to_lowercase());
    let items: Vec<Value> = lock(&state)
        .users
        .iter()
        .filter(|u| {
            search
                .as_ref()
                .is_none_or(|s| str_field(u, "email").to_lowercase().contains(s))
        })
        .cloned()
        .collect();
    let (users, total, _, _) = paginate(items, &params);
    Json(json!({ "users": users, "total": total }))
}

async fn get_user(State(state): State<Shared>, Path(email): Path<String>) -> Response {
    lock(&state)
        .users
        .iter()
        .find(|u| str_field(u, "email") == email)
        .map_or_else(
            || message(StatusCode::NOT_FOUND, "User not found"),
            |u| Json(u.clone()).into_response(),
        )
}

async fn upsert_user(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = str_field(&body, "email").to_string();
    let mut state = lock(&state);
    if let Some(user) = state.users.iter_mut().find(|u| str_field(u, "email") == email) {
        if let (Some(doc), Some(update)) = (user.as_object_mut(), body.as_object()) {
            for (key, value) in update {
                doc.insert(key.clone(), value.clone());
            }
        }
        return ack();
    }
    let id = state.next_id("u");
    let mut doc = body;
    if let Some(fields) = doc.as_object_mut() {
        fields.insert("_id".to_string(), json!(id));
        fields.insert("role".to_string(), json!("user"));
        fields.insert("badge".to_string(), json!("Bronze"));
    }
    state.users.push(doc);
    Json(json!({ "success": true, "insertedId": id })).into_response()
}

async fn make_admin(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = lock(&state);
    let Some(user) = state.users.iter_mut().find(|u| str_field(u, "_id") == id) else {
        return message(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(doc) = user.as_object_mut() {
        doc.insert("role".to_string(), json!("admin"));
    }
    ack()
}

// =============================================================================
// Reviews
// =============================================================================

async fn add_review(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let id = state.next_id("r");
    if let Some(doc) = body.as_object_mut() {
        doc.insert("_id".to_string(), json!(id));
        doc.insert("likes".to_string(), json!(0));
    }
    state.reviews.push(body);
    Json(json!({ "success": true, "insertedId": id })).into_response()
}

async fn product_reviews(State(state): State<Shared>, Path(product_id): Path<String>) -> Json<Value> {
    let reviews: Vec<Value> = lock(&state)
        .reviews
        .iter()
        .filter(|r| str_field(r, "ProductId") == product_id)
        .cloned()
        .collect();
    Json(Value::Array(reviews))
}

async fn all_reviews(State(state): State<Shared>, Query(params): Params) -> Json<Value> {
    let reviews = lock(&state).reviews.clone();
    Json(page_count_body("reviews", reviews, &params))
}

async fn my_reviews(
    State(state): State<Shared>,
    Path(email): Path<String>,
    headers: HeaderMap,
    Query(params): Params,
) -> Response {
    if bearer(&headers).is_none() {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized access");
    }
    let reviews: Vec<Value> = lock(&state)
        .reviews
        .iter()
        .filter(|r| str_field(r, "userEmail") == email)
        .cloned()
        .collect();
    Json(page_count_body("reviews", reviews, &params)).into_response()
}

// =============================================================================
// Product requests
// =============================================================================

async fn add_request(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = lock(&state);
    let product_id = str_field(&body, "productId").to_string();
    let email = str_field(&body, "userEmail").to_string();
    let duplicate = state.requests.iter().any(|r| {
        str_field(r, "productId") == product_id && str_field(r, "userEmail") == email
    });
    if duplicate {
        return message(StatusCode::BAD_REQUEST, "You have already requested this product");
    }
    let id = state.next_id("q");
    if let Some(doc) = body.as_object_mut() {
        doc.insert("_id".to_string(), json!(id));
        doc.insert("status".to_string(), json!("pending"));
    }
    state.requests.push(body);
    Json(json!({ "success": true, "insertedId": id })).into_response()
}

async fn serve_queue(State(state): State<Shared>, Query(params): Params) -> Json<Value> {
    let pending: Vec<Value> = lock(&state)
        .requests
        .iter()
        .filter(|r| str_field(r, "status") == "pending")
        .cloned()
        .collect();
    let (requests, total, _, _) = paginate(pending, &params);
    Json(json!({ "requests": requests, "total": total }))
}

async fn serve_request(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = lock(&state);
    let Some(request) = state.requests.iter_mut().find(|r| str_field(r, "_id") == id) else {
        return message(StatusCode::NOT_FOUND, "Request not found");
    };
    if let Some(doc) = request.as_object_mut() {
        doc.insert("status".to_string(), json!("delivered"));
    }
    ack()
}

// =============================================================================
// Payments
// =============================================================================

async fn create_payment_intent(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let Some(amount) = body.get("amount").and_then(Value::as_i64).filter(|a| *a > 0) else {
        return message(StatusCode::BAD_REQUEST, "Invalid amount");
    };
    let mut state = lock(&state);
    state.intent_amounts.push(amount);
    let id = state.next_id("pi_");
    Json(json!({ "clientSecret": format!("{id}_secret_test") })).into_response()
}

async fn save_payment(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = str_field(&body, "userEmail").to_string();
    let package = str_field(&body, "packageName").to_string();
    let mut chars = package.chars();
    let badge: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();

    let mut state = lock(&state);
    if let Some(doc) = state
        .users
        .iter_mut()
        .find(|u| str_field(u, "email") == email)
        .and_then(Value::as_object_mut)
    {
        doc.insert("badge".to_string(), json!(badge));
    }
    state.payments.push(body);
    ack()
}

async fn payment_history(State(state): State<Shared>, Path(email): Path<String>) -> Json<Value> {
    let payments: Vec<Value> = lock(&state)
        .payments
        .iter()
        .filter(|p| str_field(p, "userEmail") == email)
        .cloned()
        .collect();
    Json(json!({ "payments": payments }))
}

// =============================================================================
// Image host
// =============================================================================

async fn upload_image(Query(params): Params, mut multipart: Multipart) -> Response {
    if params.get("key").map(String::as_str) != Some(IMAGE_HOST_KEY) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid API v1 key." } })),
        )
            .into_response();
    }
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("image") {
            continue;
        }
        let Ok(encoded) = field.text().await else {
            break;
        };
        return Json(json!({
            "data": { "url": format!("https://img.test/{}.png", encoded.len()) },
            "success": true
        }))
        .into_response();
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": { "message": "Empty upload source." } })),
    )
        .into_response()
}

// =============================================================================
// Identity provider stub
// =============================================================================

/// Identity provider backed by a fixed set of accounts.
///
/// Google credentials are accepted when the ID token is the account email.
#[derive(Debug, Default)]
pub struct StubIdentity {
    accounts: Mutex<HashMap<String, String>>,
}

impl StubIdentity {
    #[must_use]
    pub fn with_account(email: &str, password: &str) -> Self {
        let stub = Self::default();
        stub.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email.to_string(), password.to_string());
        stub
    }

    fn identity(email: &Email) -> Identity {
        Identity::new(
            format!("uid-{}", email.local_part()),
            email.clone(),
            format!("token-{}", email.as_str()),
            "refresh",
            Utc::now() + Duration::hours(1),
        )
    }
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Identity, IdentityError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        match accounts.get(email.as_str()) {
            Some(expected) if expected == password.expose_secret() => Ok(Self::identity(email)),
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn sign_in_with_idp(&self, credential: &FederatedCredential) -> Result<Identity, IdentityError> {
        match &credential.token {
            FederatedToken::IdToken(token) if credential.provider_id == FederatedCredential::GOOGLE => {
                Ok(Self::identity(&Email::parse(token.expose_secret())?))
            }
            _ => Err(IdentityError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, email: &Email, password: &SecretString) -> Result<Identity, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(email.as_str()) {
            return Err(IdentityError::EmailExists);
        }
        accounts.insert(email.as_str().to_string(), password.expose_secret().to_string());
        Ok(Self::identity(email))
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Identity, IdentityError> {
        Ok(identity
            .clone()
            .with_profile(update.display_name.clone(), update.photo_url.clone()))
    }

    async fn send_password_reset(&self, _email: &Email) -> Result<(), IdentityError> {
        Ok(())
    }

    async fn refresh(&self, identity: &Identity) -> Result<Identity, IdentityError> {
        Ok(identity.clone())
    }
}
