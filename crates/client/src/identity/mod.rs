//! Identity provider abstraction.
//!
//! The provider owns credentials and issues the ID token that the backend
//! accepts as a bearer token. [`FirebaseIdentity`] talks to the hosted
//! identity REST API; tests substitute their own [`IdentityProvider`].

mod firebase;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use shopease_core::{Email, EmailError};

pub use firebase::FirebaseIdentity;

/// Errors reported by the identity provider.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Unknown email or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("An account with this email already exists")]
    EmailExists,

    /// The provider refused the password.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// The ID or refresh token is no longer valid.
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// The provider is throttling this client.
    #[error("Too many attempts, try again later")]
    TooManyAttempts,

    /// Any other provider error code.
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// The provider returned an unusable email address.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An authenticated identity.
///
/// Tokens are kept as secrets; [`Identity::id_token`] exposes the bearer
/// token for outgoing requests.
#[derive(Debug, Clone)]
pub struct Identity {
    /// Provider user ID.
    pub uid: String,
    pub email: Email,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    id_token: SecretString,
    refresh_token: SecretString,
    /// When the ID token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl Identity {
    #[must_use]
    pub fn new(
        uid: impl Into<String>,
        email: Email,
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            uid: uid.into(),
            email,
            display_name: None,
            photo_url: None,
            id_token: SecretString::from(id_token.into()),
            refresh_token: SecretString::from(refresh_token.into()),
            expires_at,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, display_name: Option<String>, photo_url: Option<String>) -> Self {
        self.display_name = display_name;
        self.photo_url = photo_url;
        self
    }

    /// Bearer token for the backend.
    #[must_use]
    pub fn id_token(&self) -> &str {
        self.id_token.expose_secret()
    }

    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }

    /// Whether the ID token has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Display name, falling back to the email.
    #[must_use]
    pub fn name_or_email(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Profile fields that can be changed after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// Token from an external provider's consent flow.
#[derive(Debug, Clone)]
pub enum FederatedToken {
    /// OpenID Connect ID token, as issued by Google.
    IdToken(SecretString),
    /// OAuth access token, for providers without ID tokens.
    AccessToken(SecretString),
}

/// Credential from an external identity provider.
///
/// Obtaining it (the popup or redirect) is up to the front end; the identity
/// provider only exchanges it for an [`Identity`].
#[derive(Debug, Clone)]
pub struct FederatedCredential {
    /// Provider ID such as `google.com`.
    pub provider_id: String,
    pub token: FederatedToken,
}

impl FederatedCredential {
    pub const GOOGLE: &'static str = "google.com";

    /// A Google sign-in credential.
    #[must_use]
    pub fn google(id_token: impl Into<String>) -> Self {
        Self {
            provider_id: Self::GOOGLE.to_string(),
            token: FederatedToken::IdToken(SecretString::from(id_token.into())),
        }
    }
}

/// Email/password and federated identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Identity, IdentityError>;

    /// Exchange an external provider credential, creating the account on
    /// first use.
    async fn sign_in_with_idp(&self, credential: &FederatedCredential) -> Result<Identity, IdentityError>;

    /// Create an account and sign it in.
    async fn sign_up(&self, email: &Email, password: &SecretString) -> Result<Identity, IdentityError>;

    /// End the provider-side session, if the provider keeps one.
    async fn sign_out(&self, identity: &Identity) -> Result<(), IdentityError>;

    /// Change display name and/or photo URL.
    async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Identity, IdentityError>;

    /// Email a password-reset link.
    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityError>;

    /// Exchange the refresh token for a fresh ID token.
    async fn refresh(&self, identity: &Identity) -> Result<Identity, IdentityError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn identity() -> Identity {
        Identity::new(
            "uid-1",
            Email::parse("shopper@x.io").unwrap(),
            "id-token-value",
            "refresh-token-value",
            Utc::now() + Duration::hours(1),
        )
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let debug_output = format!("{:?}", identity());
        assert!(!debug_output.contains("id-token-value"));
        assert!(!debug_output.contains("refresh-token-value"));
        assert!(debug_output.contains("shopper@x.io"));
    }

    #[test]
    fn test_name_falls_back_to_email() {
        let plain = identity();
        assert_eq!(plain.name_or_email(), "shopper@x.io");
        let named = identity().with_profile(Some("Sam".to_string()), None);
        assert_eq!(named.name_or_email(), "Sam");
    }

    #[test]
    fn test_federated_credential_redacts_token() {
        let credential = FederatedCredential::google("google-id-token");
        assert_eq!(credential.provider_id, "google.com");
        assert!(!format!("{credential:?}").contains("google-id-token"));
    }

    #[test]
    fn test_expiry() {
        let id = identity();
        assert!(!id.is_expired(Utc::now()));
        assert!(id.is_expired(id.expires_at));
        assert_eq!(id.id_token(), "id-token-value");
    }
}
