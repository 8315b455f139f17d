//! Product request endpoints.

use reqwest::Method;
use tracing::instrument;

use shopease_core::{Email, Page, PageRequest, RequestId};

use super::envelope::{PagedRequests, RequestsEnvelope};
use super::query::ListQuery;
use super::types::{MutationAck, NewProductRequest, ProductRequest};
use super::{Auth, ShopClient, segment};
use crate::error::Result;

impl ShopClient {
    /// Ask for a product (`POST /product-requests`).
    ///
    /// # Errors
    ///
    /// A repeated request fails with the backend's "already requested"
    /// message, available through `ApiError::user_message`.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn request_product(&self, request: &NewProductRequest) -> Result<MutationAck> {
        self.mutate(Method::POST, "/product-requests", Some(request), Auth::None)
            .await
    }

    /// Cancel a pending request (`DELETE /product-requests/{id}`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id), fields(request_id = %id))]
    pub async fn cancel_request(&self, id: &RequestId) -> Result<MutationAck> {
        self.mutate::<()>(
            Method::DELETE,
            &format!("/product-requests/{}", segment(id.as_str())),
            None,
            Auth::None,
        )
        .await
    }

    /// The signed-in user's requests (`GET /requested-products/{email}`, bearer).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is refused.
    #[instrument(skip(self, email, page, token), fields(page = page.page()))]
    pub async fn my_requests(
        &self,
        email: &Email,
        page: PageRequest,
        token: &str,
    ) -> Result<Page<ProductRequest>> {
        let query = ListQuery::new(page);
        self.get_page::<PagedRequests>(
            &format!("/requested-products/{}", segment(email.as_str())),
            &query.to_params(),
            page,
            Auth::Bearer(token),
        )
        .await
    }

    /// Pending requests across all users (`GET /serve-products`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, query), fields(page = query.page().page()))]
    pub async fn serve_queue(&self, query: &ListQuery) -> Result<Page<ProductRequest>> {
        self.get_page::<RequestsEnvelope>("/serve-products", &query.to_params(), query.page(), Auth::None)
            .await
    }

    /// Mark a request delivered (`PUT /serve-products/{id}/serve`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id), fields(request_id = %id))]
    pub async fn serve_request(&self, id: &RequestId) -> Result<MutationAck> {
        self.mutate::<()>(
            Method::PUT,
            &format!("/serve-products/{}/serve", segment(id.as_str())),
            None,
            Auth::None,
        )
        .await
    }
}
