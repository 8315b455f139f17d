//! Upcoming product endpoints.

use reqwest::Method;
use tracing::instrument;

use shopease_core::{Email, Page, PageRequest, ProductId};

use super::types::product::{LikeRequest, PublishRequest};
use super::types::{MutationAck, NewUpcomingProduct, UpcomingProduct};
use super::{Auth, ShopClient, segment};
use crate::error::Result;

impl ShopClient {
    /// All upcoming products (`GET /upcoming-products`, bare array).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, token))]
    pub async fn upcoming_products(&self, token: Option<&str>) -> Result<Page<UpcomingProduct>> {
        self.get_page::<Vec<UpcomingProduct>>(
            "/upcoming-products",
            &[],
            PageRequest::default(),
            Auth::bearer_opt(token),
        )
        .await
    }

    /// Announce a product (`POST /upcoming-products`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before sending if any field is blank,
    /// the publish date is missing, or the price is not positive.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn add_upcoming_product(&self, product: &NewUpcomingProduct) -> Result<MutationAck> {
        product.validate()?;
        self.mutate(Method::POST, "/upcoming-products", Some(product), Auth::None)
            .await
    }

    /// Promote an upcoming product into the catalog
    /// (`POST /upcoming-products/publish`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id, admin_email), fields(product_id = %id))]
    pub async fn publish_upcoming_product(&self, id: &ProductId, admin_email: &Email) -> Result<MutationAck> {
        self.mutate(
            Method::POST,
            "/upcoming-products/publish",
            Some(&PublishRequest {
                product_id: id,
                added_by_email: admin_email,
            }),
            Auth::None,
        )
        .await
    }

    /// Raw like request (`PATCH /upcoming-products/{id}/like`, bearer).
    ///
    /// Prefer [`crate::likes::like_upcoming`], which enforces the premium
    /// badge check and the optimistic update.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id, email, token), fields(product_id = %id))]
    pub async fn send_upcoming_like(&self, id: &ProductId, email: &Email, token: &str) -> Result<MutationAck> {
        self.mutate(
            Method::PATCH,
            &format!("/upcoming-products/{}/like", segment(id.as_str())),
            Some(&LikeRequest { user_email: email }),
            Auth::Bearer(token),
        )
        .await
    }
}
