//! Identity Toolkit REST implementation of [`IdentityProvider`].
//!
//! Endpoints (API key passed as `?key=`):
//! - `POST {toolkit}/accounts:signInWithPassword`
//! - `POST {toolkit}/accounts:signInWithIdp`
//! - `POST {toolkit}/accounts:signUp`
//! - `POST {toolkit}/accounts:update`
//! - `POST {toolkit}/accounts:sendOobCode`
//! - `POST {secure_token}/token` (form-encoded refresh)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use shopease_core::Email;

use super::{
    FederatedCredential, FederatedToken, Identity, IdentityError, IdentityProvider, ProfileUpdate,
};
use crate::config::IdentityConfig;

/// Token lifetime assumed when the provider omits `expiresIn`.
const DEFAULT_EXPIRES_SECS: i64 = 3600;

/// Continue URI for credential exchanges; the toolkit requires one but does
/// not redirect when the token is posted directly.
const IDP_REQUEST_URI: &str = "http://localhost";

/// Identity provider backed by the hosted Identity Toolkit API.
#[derive(Clone)]
pub struct FirebaseIdentity {
    inner: Arc<FirebaseIdentityInner>,
}

struct FirebaseIdentityInner {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl std::fmt::Debug for FirebaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseIdentity")
            .field("config", &self.inner.config)
            .finish()
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    #[serde(default)]
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

fn expires_at(expires_in: Option<&str>) -> chrono::DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_SECS);
    Utc::now() + Duration::seconds(secs)
}

/// Map a provider error code (`EMAIL_EXISTS`, `WEAK_PASSWORD : ...`).
fn map_error_code(message: &str) -> IdentityError {
    let (code, detail) = message
        .split_once(" : ")
        .map_or((message.trim(), None), |(c, d)| (c.trim(), Some(d.trim())));
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            IdentityError::InvalidCredentials
        }
        "INVALID_IDP_RESPONSE" | "INVALID_CREDENTIAL_OR_PROVIDER_ID" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" | "FEDERATED_USER_ID_ALREADY_LINKED" => IdentityError::EmailExists,
        "WEAK_PASSWORD" => IdentityError::WeakPassword(detail.unwrap_or(code).to_string()),
        "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND"
        | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => IdentityError::SessionExpired,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => IdentityError::TooManyAttempts,
        _ => IdentityError::Provider(message.to_string()),
    }
}

/// Form-encoded `postBody` carrying the external token and provider ID.
fn idp_post_body(credential: &FederatedCredential) -> String {
    let (key, token) = match &credential.token {
        FederatedToken::IdToken(token) => ("id_token", token),
        FederatedToken::AccessToken(token) => ("access_token", token),
    };
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair(key, token.expose_secret())
        .append_pair("providerId", &credential.provider_id)
        .finish()
}

// =============================================================================
// FirebaseIdentity
// =============================================================================

impl FirebaseIdentity {
    /// Create a provider for the configured project.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Http` if the HTTP client cannot be built.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(FirebaseIdentityInner {
                http,
                config: config.clone(),
            }),
        })
    }

    fn url(&self, root: &str, action: &str) -> Result<Url, IdentityError> {
        let mut url = Url::parse(&format!("{}/{action}", root.trim_end_matches('/')))
            .map_err(|e| IdentityError::Parse(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.config.api_key.expose_secret());
        Ok(url)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let url = self.url(&self.inner.config.identity_toolkit_url, action)?;
        let response = self.inner.http.post(url).json(body).send().await?;
        decode(response, action).await
    }

    fn identity_from(
        account: AccountResponse,
        fallback: Option<&Identity>,
    ) -> Result<Identity, IdentityError> {
        let email = match (account.email.as_deref(), fallback) {
            (Some(raw), _) => Email::parse(raw)?,
            (None, Some(previous)) => previous.email.clone(),
            (None, None) => return Err(IdentityError::Parse("response has no email".to_string())),
        };
        let id_token = account
            .id_token
            .or_else(|| fallback.map(|f| f.id_token().to_string()))
            .ok_or_else(|| IdentityError::Parse("response has no idToken".to_string()))?;
        let refresh_token = account
            .refresh_token
            .or_else(|| fallback.map(|f| f.refresh_token().to_string()))
            .unwrap_or_default();
        let uid = if account.local_id.is_empty() {
            fallback.map(|f| f.uid.clone()).unwrap_or_default()
        } else {
            account.local_id
        };
        let expires = if account.expires_in.is_none() {
            fallback.map_or_else(|| expires_at(None), |f| f.expires_at)
        } else {
            expires_at(account.expires_in.as_deref())
        };

        Ok(Identity::new(uid, email, id_token, refresh_token, expires).with_profile(
            account
                .display_name
                .or_else(|| fallback.and_then(|f| f.display_name.clone())),
            account
                .photo_url
                .or_else(|| fallback.and_then(|f| f.photo_url.clone())),
        ))
    }
}

/// Decode a provider response, mapping its error envelope.
async fn decode<T: DeserializeOwned>(response: reqwest::Response, action: &str) -> Result<T, IdentityError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {status}"));
        debug!(%status, action, code = %message, "Identity provider refused request");
        return Err(map_error_code(&message));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, action, "Failed to parse identity provider response");
        IdentityError::Parse(e.to_string())
    })
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    #[instrument(skip(self, email, password))]
    async fn sign_in_with_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .post_json(
                "accounts:signInWithPassword",
                &PasswordRequest {
                    email: email.as_str(),
                    password: password.expose_secret(),
                    return_secure_token: true,
                },
            )
            .await?;
        Self::identity_from(account, None)
    }

    #[instrument(skip(self, credential), fields(provider = %credential.provider_id))]
    async fn sign_in_with_idp(&self, credential: &FederatedCredential) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .post_json(
                "accounts:signInWithIdp",
                &IdpRequest {
                    post_body: idp_post_body(credential),
                    request_uri: IDP_REQUEST_URI,
                    return_secure_token: true,
                    return_idp_credential: true,
                },
            )
            .await?;
        Self::identity_from(account, None)
    }

    #[instrument(skip(self, email, password))]
    async fn sign_up(&self, email: &Email, password: &SecretString) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .post_json(
                "accounts:signUp",
                &PasswordRequest {
                    email: email.as_str(),
                    password: password.expose_secret(),
                    return_secure_token: true,
                },
            )
            .await?;
        Self::identity_from(account, None)
    }

    async fn sign_out(&self, _identity: &Identity) -> Result<(), IdentityError> {
        // Stateless REST API: tokens simply stop being used.
        Ok(())
    }

    #[instrument(skip(self, identity, update))]
    async fn update_profile(
        &self,
        identity: &Identity,
        update: &ProfileUpdate,
    ) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .post_json(
                "accounts:update",
                &UpdateRequest {
                    id_token: identity.id_token(),
                    display_name: update.display_name.as_deref(),
                    photo_url: update.photo_url.as_deref(),
                    return_secure_token: true,
                },
            )
            .await?;
        Self::identity_from(account, Some(identity))
    }

    #[instrument(skip(self, email))]
    async fn send_password_reset(&self, email: &Email) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .post_json(
                "accounts:sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email: email.as_str(),
                },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, identity))]
    async fn refresh(&self, identity: &Identity) -> Result<Identity, IdentityError> {
        let url = self.url(&self.inner.config.secure_token_url, "token")?;
        let response = self
            .inner
            .http
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", identity.refresh_token()),
            ])
            .send()
            .await?;
        let refreshed: RefreshResponse = decode(response, "token").await?;

        Ok(Identity::new(
            refreshed.user_id.unwrap_or_else(|| identity.uid.clone()),
            identity.email.clone(),
            refreshed.id_token,
            refreshed.refresh_token,
            expires_at(refreshed.expires_in.as_deref()),
        )
        .with_profile(identity.display_name.clone(), identity.photo_url.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error_codes() {
        assert!(matches!(
            map_error_code("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(map_error_code("EMAIL_EXISTS"), IdentityError::EmailExists));
        match map_error_code("WEAK_PASSWORD : Password should be at least 6 characters") {
            IdentityError::WeakPassword(detail) => {
                assert_eq!(detail, "Password should be at least 6 characters");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(map_error_code("TOKEN_EXPIRED"), IdentityError::SessionExpired));
        assert!(matches!(map_error_code("USER_DISABLED"), IdentityError::Provider(_)));
    }

    #[test]
    fn test_idp_post_body() {
        assert_eq!(
            idp_post_body(&FederatedCredential::google("abc.def+1")),
            "id_token=abc.def%2B1&providerId=google.com"
        );
        let github = FederatedCredential {
            provider_id: "github.com".to_string(),
            token: FederatedToken::AccessToken(SecretString::from("gho_1".to_string())),
        };
        assert_eq!(idp_post_body(&github), "access_token=gho_1&providerId=github.com");
        assert!(matches!(
            map_error_code("INVALID_IDP_RESPONSE : bad token"),
            IdentityError::InvalidCredentials
        ));
    }

    #[test]
    fn test_identity_from_idp_response() {
        let account: AccountResponse = serde_json::from_str(
            r#"{"federatedId":"https://accounts.google.com/1","providerId":"google.com","localId":"u9","email":"fan@x.io","displayName":"Fan","photoUrl":"https://img/fan.png","idToken":"t","refreshToken":"r","expiresIn":"3600"}"#,
        )
        .unwrap();
        let identity = FirebaseIdentity::identity_from(account, None).unwrap();
        assert_eq!(identity.email.as_str(), "fan@x.io");
        assert_eq!(identity.photo_url.as_deref(), Some("https://img/fan.png"));
        assert_eq!(identity.refresh_token(), "r");
    }

    #[test]
    fn test_url_carries_api_key() {
        let provider = FirebaseIdentity::new(&IdentityConfig::new("test-key".to_string())).unwrap();
        let url = provider
            .url("https://identitytoolkit.googleapis.com/v1/", "accounts:signUp")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signUp?key=test-key"
        );
    }

    #[test]
    fn test_identity_from_sign_in_response() {
        let account: AccountResponse = serde_json::from_str(
            r#"{"localId":"u1","email":"a@x.io","displayName":"A","idToken":"t","refreshToken":"r","expiresIn":"3600"}"#,
        )
        .unwrap();
        let identity = FirebaseIdentity::identity_from(account, None).unwrap();
        assert_eq!(identity.uid, "u1");
        assert_eq!(identity.display_name.as_deref(), Some("A"));
        assert_eq!(identity.id_token(), "t");
        assert!(!identity.is_expired(Utc::now()));
    }

    #[test]
    fn test_identity_from_update_keeps_previous_tokens() {
        let previous = Identity::new(
            "u1",
            Email::parse("a@x.io").unwrap(),
            "old-token",
            "old-refresh",
            Utc::now() + Duration::minutes(30),
        );
        let account: AccountResponse =
            serde_json::from_str(r#"{"localId":"u1","photoUrl":"https://img/a.png"}"#).unwrap();
        let identity = FirebaseIdentity::identity_from(account, Some(&previous)).unwrap();
        assert_eq!(identity.id_token(), "old-token");
        assert_eq!(identity.photo_url.as_deref(), Some("https://img/a.png"));
        assert_eq!(identity.expires_at, previous.expires_at);
    }

    #[test]
    fn test_identity_from_requires_token() {
        let account: AccountResponse =
            serde_json::from_str(r#"{"localId":"u1","email":"a@x.io"}"#).unwrap();
        assert!(matches!(
            FirebaseIdentity::identity_from(account, None),
            Err(IdentityError::Parse(_))
        ));
    }
}
