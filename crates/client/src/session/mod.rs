//! Identity session store.
//!
//! A [`SessionStore`] is created once and passed by handle to everything
//! that needs the signed-in identity. It publishes [`SessionState`] through a
//! `tokio::sync::watch` channel; consumers hold a [`SessionSubscription`]
//! and stop receiving updates when they drop it.
//!
//! ```text
//! Uninitialized ──restore──▶ Authenticated | Anonymous
//!        │                        ▲    │
//!        └──sign_in──▶ Loading ───┘    └──sign_out──▶ Anonymous
//! ```
//!
//! Token refreshes and profile updates that complete after a sign-out are
//! discarded rather than signing the user back in.

mod token_cache;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use shopease_core::Email;

use crate::api::ShopClient;
use crate::api::types::UserUpsert;
use crate::error::{ApiError, Result};
use crate::identity::{FederatedCredential, Identity, IdentityError, IdentityProvider, ProfileUpdate};
use crate::validation;

pub use token_cache::{TOKEN_TTL, TokenCache};

/// Lifecycle of the identity session.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Nothing is known yet.
    #[default]
    Uninitialized,
    /// A sign-in or sign-up is in flight.
    Loading,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Whether the session has resolved to signed-in or signed-out.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Authenticated(_) | Self::Anonymous)
    }
}

/// A live view of the session. Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<SessionState>,
}

impl SessionSubscription {
    /// The latest state, marking it seen.
    pub fn current(&mut self) -> SessionState {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next state change.
    ///
    /// Returns `None` once the store has been dropped.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

/// Registration form input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub photo_url: Option<String>,
}

/// Shared identity session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    state: watch::Sender<SessionState>,
    provider: Arc<dyn IdentityProvider>,
    client: ShopClient,
    tokens: TokenCache,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store in [`SessionState::Uninitialized`].
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>, client: ShopClient) -> Self {
        Self::with_token_cache(provider, client, TokenCache::new())
    }

    #[must_use]
    pub fn with_token_cache(
        provider: Arc<dyn IdentityProvider>,
        client: ShopClient,
        tokens: TokenCache,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            inner: Arc::new(SessionStoreInner {
                state,
                provider,
                client,
                tokens,
            }),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity().cloned()
    }

    /// Bearer token of the signed-in identity.
    #[must_use]
    pub fn id_token(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .identity()
            .map(|identity| identity.id_token().to_string())
    }

    /// Last cached token for `email`, signed in or not.
    pub async fn cached_token(&self, email: &Email) -> Option<String> {
        self.inner.tokens.token(email).await
    }

    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.inner.state.subscribe(),
        }
    }

    /// Resolve the initial state from a persisted identity, if any.
    pub async fn restore(&self, identity: Option<Identity>) {
        match identity {
            Some(identity) => self.authenticate(identity).await,
            None => self.publish(SessionState::Anonymous),
        }
    }

    /// Sign in with email and password, then upsert the user record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Identity` if the provider refuses. A failed upsert
    /// is logged and does not fail the sign-in.
    #[instrument(skip(self, email, password))]
    pub async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<Identity> {
        let previous = self.begin_loading();
        let result = self.inner.provider.sign_in_with_password(email, password).await;
        self.finish_sign_in(previous, result).await
    }

    /// Sign in with a credential from an external provider, then upsert the
    /// user record. The account is created on first use.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Identity` if the provider rejects the credential.
    #[instrument(skip(self, credential), fields(provider = %credential.provider_id))]
    pub async fn sign_in_federated(&self, credential: &FederatedCredential) -> Result<Identity> {
        let previous = self.begin_loading();
        let result = self.inner.provider.sign_in_with_idp(credential).await;
        self.finish_sign_in(previous, result).await
    }

    /// Create an account, set its profile, then upsert the user record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` before contacting the provider if the
    /// password breaks the registration rules, or `ApiError::Identity`.
    #[instrument(skip(self, registration))]
    pub async fn register(&self, registration: &Registration) -> Result<Identity> {
        validation::password(registration.password.expose_secret())?;
        validation::require("name", &registration.name)?;

        let previous = self.begin_loading();
        let update = ProfileUpdate {
            display_name: Some(registration.name.trim().to_string()),
            photo_url: registration.photo_url.clone(),
        };
        let provider = &self.inner.provider;
        let result = match provider.sign_up(&registration.email, &registration.password).await {
            Ok(identity) => provider.update_profile(&identity, &update).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(identity) => {
                self.authenticate(identity.clone()).await;
                self.upsert(&identity).await;
                info!("Registered");
                Ok(identity)
            }
            Err(e) => {
                self.fail_loading(previous);
                Err(e.into())
            }
        }
    }

    /// Sign out and clear the cached token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Identity` if the provider fails; the local session
    /// is cleared regardless.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<()> {
        let Some(identity) = self.identity() else {
            self.publish(SessionState::Anonymous);
            return Ok(());
        };
        self.inner.tokens.invalidate(&identity.email).await;
        self.publish(SessionState::Anonymous);
        self.inner.provider.sign_out(&identity).await?;
        Ok(())
    }

    /// Update the signed-in profile and republish the identity.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotSignedIn` without a session or if the session
    /// was signed out before the provider answered, or the provider failure.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Identity> {
        let identity = self.identity().ok_or(ApiError::NotSignedIn)?;
        let updated = self.inner.provider.update_profile(&identity, update).await?;
        if !self.reauthenticate(&updated).await {
            debug!("Session changed during profile update, discarding result");
            return Err(ApiError::NotSignedIn);
        }
        Ok(updated)
    }

    /// Email a password-reset link.
    ///
    /// # Errors
    ///
    /// Returns the provider failure.
    #[instrument(skip(self, email))]
    pub async fn send_password_reset(&self, email: &Email) -> Result<()> {
        self.inner.provider.send_password_reset(email).await?;
        Ok(())
    }

    /// Replace the ID token using the refresh token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotSignedIn` without a session, or if the session
    /// was signed out while the refresh was in flight. A rejected refresh
    /// token signs the session out.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Identity> {
        let identity = self.identity().ok_or(ApiError::NotSignedIn)?;
        match self.inner.provider.refresh(&identity).await {
            Ok(refreshed) => {
                if self.reauthenticate(&refreshed).await {
                    Ok(refreshed)
                } else {
                    debug!("Session changed during refresh, discarding token");
                    Err(ApiError::NotSignedIn)
                }
            }
            Err(IdentityError::SessionExpired) => {
                warn!("Refresh token rejected, signing out");
                self.inner.tokens.invalidate(&identity.email).await;
                self.inner.state.send_if_modified(|state| {
                    let current = is_signed_in_as(state, &identity.email);
                    if current {
                        *state = SessionState::Anonymous;
                    }
                    current
                });
                Err(ApiError::Identity(IdentityError::SessionExpired))
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn publish(&self, state: SessionState) {
        self.inner.state.send_replace(state);
    }

    fn begin_loading(&self) -> SessionState {
        self.inner.state.send_replace(SessionState::Loading)
    }

    /// Return to the pre-loading state, or anonymous if nothing was known.
    fn fail_loading(&self, previous: SessionState) {
        let state = match previous {
            SessionState::Authenticated(_) => previous,
            _ => SessionState::Anonymous,
        };
        self.publish(state);
    }

    async fn finish_sign_in(
        &self,
        previous: SessionState,
        result: std::result::Result<Identity, IdentityError>,
    ) -> Result<Identity> {
        match result {
            Ok(identity) => {
                self.authenticate(identity.clone()).await;
                self.upsert(&identity).await;
                info!("Signed in");
                Ok(identity)
            }
            Err(e) => {
                self.fail_loading(previous);
                Err(e.into())
            }
        }
    }

    /// Replace the identity only while the same account is still signed in.
    ///
    /// Returns `false` and leaves the session and token cache untouched if a
    /// sign-out (or another account's sign-in) happened in the meantime.
    async fn reauthenticate(&self, identity: &Identity) -> bool {
        let replaced = self.inner.state.send_if_modified(|state| {
            let current = is_signed_in_as(state, &identity.email);
            if current {
                *state = SessionState::Authenticated(identity.clone());
            }
            current
        });
        if !replaced {
            return false;
        }

        self.inner
            .tokens
            .store(&identity.email, identity.id_token())
            .await;
        // A sign-out may have slipped in while the token was being stored
        let still_current = is_signed_in_as(&self.inner.state.borrow(), &identity.email);
        if !still_current {
            self.inner.tokens.invalidate(&identity.email).await;
            return false;
        }
        true
    }

    async fn authenticate(&self, identity: Identity) {
        self.inner
            .tokens
            .store(&identity.email, identity.id_token())
            .await;
        self.publish(SessionState::Authenticated(identity));
    }

    async fn upsert(&self, identity: &Identity) {
        let body = UserUpsert {
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
            photo_url: identity.photo_url.clone(),
        };
        if let Err(e) = self
            .inner
            .client
            .upsert_user(&body, Some(identity.id_token()))
            .await
        {
            warn!(error = %e, "Failed to upsert user after sign-in");
        }
    }
}

fn is_signed_in_as(state: &SessionState, email: &Email) -> bool {
    state.identity().is_some_and(|identity| identity.email == *email)
}
