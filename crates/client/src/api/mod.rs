//! ShopEase REST API client.
//!
//! One method per backend endpoint, grouped by resource in the submodules.
//! Every call is a single request: no retry, no backoff, no caching. List
//! endpoints are normalized to [`Page`](shopease_core::Page) through the
//! adapters in [`envelope`].

pub mod envelope;
pub mod query;
pub mod types;

mod payments;
mod products;
mod requests;
mod reviews;
mod upcoming;
mod users;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use shopease_core::{Page, PageRequest};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};
use envelope::Envelope;
use types::MutationAck;
use types::common::ErrorBody;

pub use query::{ListQuery, SortOrder};

/// Header naming the acting admin on product deletion.
pub const ADMIN_EMAIL_HEADER: &str = "x-admin-email";

/// Credentials attached to a single request.
#[derive(Clone, Copy, Default)]
pub enum Auth<'a> {
    /// Public endpoint.
    #[default]
    None,
    /// `Authorization: Bearer <id token>`.
    Bearer(&'a str),
    /// `x-admin-email: <email>`; empty when the acting admin is unknown.
    AdminEmail(&'a str),
}

impl<'a> Auth<'a> {
    /// Bearer auth when a token is available, none otherwise.
    #[must_use]
    pub fn bearer_opt(token: Option<&'a str>) -> Self {
        token.map_or(Self::None, Self::Bearer)
    }

    fn apply(self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => builder,
            Self::Bearer(token) => builder.bearer_auth(token),
            Self::AdminEmail(email) => builder.header(ADMIN_EMAIL_HEADER, email),
        }
    }
}

impl std::fmt::Debug for Auth<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.write_str("Bearer([REDACTED])"),
            Self::AdminEmail(email) => f.debug_tuple("AdminEmail").field(email).finish(),
        }
    }
}

// =============================================================================
// ShopClient
// =============================================================================

/// Client for the ShopEase backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    http: reqwest::Client,
    config: ApiConfig,
}

impl std::fmt::Debug for ShopClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ShopClient {
    /// Create a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self::with_http_client(http, config.clone()))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(http: reqwest::Client, config: ApiConfig) -> Self {
        Self {
            inner: Arc::new(ShopClientInner { http, config }),
        }
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.config.base_url
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    fn url(&self, path: &str, params: &[(&'static str, String)]) -> Result<Url> {
        let mut url = Url::parse(&self.inner.config.endpoint(path))
            .map_err(|e| ApiError::Parse(format!("invalid URL for {path}: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        auth: Auth<'_>,
    ) -> Result<RequestBuilder> {
        let url = self.url(path, params)?;
        Ok(auth.apply(self.inner.http.request(method, url)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        auth: Auth<'_>,
    ) -> Result<T> {
        let builder = self.request(Method::GET, path, params, auth)?;
        send(builder).await
    }

    /// GET a list endpoint and normalize its envelope.
    async fn get_page<E: Envelope>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        page: PageRequest,
        auth: Auth<'_>,
    ) -> Result<Page<E::Item>> {
        let envelope: E = self.get(path, params, auth).await?;
        Ok(envelope.into_page(page))
    }

    /// Send a create/update/delete and check the acknowledgement.
    async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        auth: Auth<'_>,
    ) -> Result<MutationAck> {
        let mut builder = self.request(method, path, &[], auth)?;
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let ack: Option<MutationAck> = send(builder).await?;
        ack.unwrap_or_default().into_result()
    }
}

/// Send a request and decode a JSON body.
async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let response = builder.send().await?;
    let status = response.status();
    let url = response.url().path().to_string();

    // Body as text first so failures can be diagnosed
    let body = response.text().await?;

    debug!(%status, path = %url, bytes = body.len(), "ShopEase API response");

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    // Some mutations answer with an empty body
    let json = if body.trim().is_empty() { "null" } else { body.as_str() };

    serde_json::from_str(json).map_err(|e| {
        tracing::error!(
            error = %e,
            path = %url,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse ShopEase API response"
        );
        ApiError::Parse(e.to_string())
    })
}

/// Map a non-success response to an [`ApiError`].
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message);

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        debug!(%status, "ShopEase API refused credentials");
        return ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        };
    }

    tracing::warn!(
        status = %status,
        body = %body.chars().take(200).collect::<String>(),
        "ShopEase API returned non-success status"
    );
    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Percent-encode a value used as a path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ShopClient {
        ShopClient::new(&ApiConfig::new("http://localhost:5000/").unwrap()).unwrap()
    }

    #[test]
    fn test_url_with_params() {
        let url = client()
            .url("/products", &[("search", "dried mango".to_string()), ("page", "1".to_string())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/products?search=dried+mango&page=1"
        );
    }

    #[test]
    fn test_segment_encodes_email() {
        assert_eq!(segment("a+b@x.io"), "a%2Bb%40x.io");
    }

    #[test]
    fn test_status_error_extracts_message() {
        let err = status_error(StatusCode::CONFLICT, r#"{"message":"Already requested"}"#);
        assert_eq!(err.server_message(), Some("Already requested"));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_status_error_unauthorized() {
        let err = status_error(StatusCode::FORBIDDEN, "forbidden");
        assert!(err.is_unauthorized());
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_auth_debug_redacts_token() {
        let debug_output = format!("{:?}", Auth::Bearer("secret-id-token"));
        assert!(!debug_output.contains("secret-id-token"));
    }
}
