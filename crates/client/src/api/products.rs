//! Product endpoints.

use reqwest::Method;
use tracing::instrument;

use shopease_core::{Email, Page, ProductId};

use super::envelope::ProductsEnvelope;
use super::query::ListQuery;
use super::types::product::LikeRequest;
use super::types::{MutationAck, NewProduct, Product, ProductUpdate};
use super::{Auth, ShopClient, segment};
use crate::error::Result;

impl ShopClient {
    /// Browse products with server-side filters (`GET /products`).
    ///
    /// The product browser sends its bearer token when signed in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, query, token), fields(page = query.page().page(), limit = query.page().limit()))]
    pub async fn list_products(&self, query: &ListQuery, token: Option<&str>) -> Result<Page<Product>> {
        self.get_page::<ProductsEnvelope>(
            "/products",
            &query.to_params(),
            query.page(),
            Auth::bearer_opt(token),
        )
        .await
    }

    /// Admin product table (`GET /all-products`), sortable by any field.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, query), fields(page = query.page().page(), limit = query.page().limit()))]
    pub async fn all_products(&self, query: &ListQuery) -> Result<Page<Product>> {
        self.get_page::<ProductsEnvelope>("/all-products", &query.to_params(), query.page(), Auth::None)
            .await
    }

    /// Fetch one product (`GET /products/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 404 if the product does not exist.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product> {
        self.get(&format!("/products/{}", segment(id.as_str())), &[], Auth::None)
            .await
    }

    /// Create a product (`POST /products`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before sending if a required field is
    /// blank, or `ApiError::Rejected` if the backend refuses.
    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn add_product(&self, product: &NewProduct) -> Result<MutationAck> {
        product.validate()?;
        self.mutate(Method::POST, "/products", Some(product), Auth::None)
            .await
    }

    /// Replace a product's editable fields (`PUT /products/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before sending, or the backend failure.
    #[instrument(skip(self, id, update), fields(product_id = %id))]
    pub async fn update_product(&self, id: &ProductId, update: &ProductUpdate) -> Result<MutationAck> {
        update.validate()?;
        self.mutate(
            Method::PUT,
            &format!("/products/{}", segment(id.as_str())),
            Some(update),
            Auth::None,
        )
        .await
    }

    /// Delete a product (`DELETE /products/{id}`).
    ///
    /// The acting admin is sent in `x-admin-email`; the backend decides
    /// whether that admin may delete a product someone else added.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` or `ApiError::Status` carrying the
    /// backend's reason when the deletion is refused.
    #[instrument(skip(self, id, admin_email), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId, admin_email: Option<&Email>) -> Result<MutationAck> {
        let admin = admin_email.map_or("", Email::as_str);
        self.mutate::<()>(
            Method::DELETE,
            &format!("/products/{}", segment(id.as_str())),
            None,
            Auth::AdminEmail(admin),
        )
        .await
    }

    /// Raw like request (`PATCH /products/{id}/like`).
    ///
    /// Prefer [`crate::likes::like_product`], which applies the client-side
    /// checks and the optimistic update.
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id, email), fields(product_id = %id))]
    pub async fn send_product_like(&self, id: &ProductId, email: &Email) -> Result<MutationAck> {
        self.mutate(
            Method::PATCH,
            &format!("/products/{}/like", segment(id.as_str())),
            Some(&LikeRequest { user_email: email }),
            Auth::None,
        )
        .await
    }
}
