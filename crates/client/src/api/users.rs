//! User and admin endpoints.

use reqwest::Method;
use tracing::instrument;

use shopease_core::{Email, Page, UserId};

use super::envelope::UsersEnvelope;
use super::query::ListQuery;
use super::types::{AdminProfile, MutationAck, User, UserUpsert};
use super::{Auth, ShopClient, segment};
use crate::error::Result;

impl ShopClient {
    /// Registered users (`GET /users`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, query), fields(page = query.page().page()))]
    pub async fn users(&self, query: &ListQuery) -> Result<Page<User>> {
        self.get_page::<UsersEnvelope>("/users", &query.to_params(), query.page(), Auth::None)
            .await
    }

    /// Look up one user by email (`GET /users/{email}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, email))]
    pub async fn user(&self, email: &Email) -> Result<User> {
        self.get(&format!("/users/{}", segment(email.as_str())), &[], Auth::None)
            .await
    }

    /// Create or refresh the user record after sign-in (`POST /users/upsert`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, user, token))]
    pub async fn upsert_user(&self, user: &UserUpsert, token: Option<&str>) -> Result<MutationAck> {
        self.mutate(Method::POST, "/users/upsert", Some(user), Auth::bearer_opt(token))
            .await
    }

    /// Promote a user to admin (`PATCH /users/{id}/make-admin`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, id), fields(user_id = %id))]
    pub async fn make_admin(&self, id: &UserId) -> Result<MutationAck> {
        self.mutate::<()>(
            Method::PATCH,
            &format!("/users/{}/make-admin", segment(id.as_str())),
            None,
            Auth::None,
        )
        .await
    }

    /// Dashboard profile of an admin (`GET /admin/profile/{email}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, email))]
    pub async fn admin_profile(&self, email: &Email) -> Result<AdminProfile> {
        self.get(&format!("/admin/profile/{}", segment(email.as_str())), &[], Auth::None)
            .await
    }
}
