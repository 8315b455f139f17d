//! Review endpoints.

use reqwest::Method;
use tracing::instrument;

use shopease_core::{Email, Page, PageRequest, ProductId, ReviewId};

use super::envelope::PagedReviews;
use super::types::review::ReviewEdit;
use super::types::{MutationAck, NewReview, Review};
use super::{Auth, ShopClient, segment};
use crate::error::Result;
use crate::validation;

fn page_params(page: PageRequest) -> [(&'static str, String); 2] {
    [
        ("page", page.page().to_string()),
        ("limit", page.limit().to_string()),
    ]
}

impl ShopClient {
    /// Reviews of one product (`GET /reviews/{productId}`, bare array).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, product_id), fields(product_id = %product_id))]
    pub async fn product_reviews(&self, product_id: &ProductId) -> Result<Page<Review>> {
        self.get_page::<Vec<Review>>(
            &format!("/reviews/{}", segment(product_id.as_str())),
            &[],
            PageRequest::default(),
            Auth::None,
        )
        .await
    }

    /// One review, for the edit form (`GET /reviews/{reviewId}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, id), fields(review_id = %id))]
    pub async fn review(&self, id: &ReviewId) -> Result<Review> {
        self.get(&format!("/reviews/{}", segment(id.as_str())), &[], Auth::None)
            .await
    }

    /// Post a review (`POST /reviews`). The comment is trimmed first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a blank comment.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn add_review(&self, review: &NewReview) -> Result<MutationAck> {
        let body = NewReview {
            comment: validation::review_comment(&review.comment)?,
            ..review.clone()
        };
        self.mutate(Method::POST, "/reviews", Some(&body), Auth::None)
            .await
    }

    /// Replace a review's comment (`PUT /reviews/{id}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a blank comment.
    #[instrument(skip(self, id, comment), fields(review_id = %id))]
    pub async fn edit_review(&self, id: &ReviewId, comment: &str) -> Result<MutationAck> {
        let comment = validation::review_comment(comment)?;
        self.mutate(
            Method::PUT,
            &format!("/reviews/{}", segment(id.as_str())),
            Some(&ReviewEdit { comment: &comment }),
            Auth::None,
        )
        .await
    }

    /// Delete a review (`DELETE /reviews/{id}`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id), fields(review_id = %id))]
    pub async fn delete_review(&self, id: &ReviewId) -> Result<MutationAck> {
        self.mutate::<()>(
            Method::DELETE,
            &format!("/reviews/{}", segment(id.as_str())),
            None,
            Auth::None,
        )
        .await
    }

    /// The signed-in user's reviews (`GET /my-reviews/{email}`, bearer).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is refused.
    #[instrument(skip(self, email, page, token), fields(page = page.page()))]
    pub async fn my_reviews(&self, email: &Email, page: PageRequest, token: &str) -> Result<Page<Review>> {
        self.get_page::<PagedReviews>(
            &format!("/my-reviews/{}", segment(email.as_str())),
            &page_params(page),
            page,
            Auth::Bearer(token),
        )
        .await
    }

    /// Every review, for moderation (`GET /all-reviews`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, page), fields(page = page.page()))]
    pub async fn all_reviews(&self, page: PageRequest) -> Result<Page<Review>> {
        self.get_page::<PagedReviews>("/all-reviews", &page_params(page), page, Auth::None)
            .await
    }
}
