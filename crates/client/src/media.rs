//! Image upload to the hosted image service.
//!
//! Images are sent base64-encoded in a multipart `image` field; the service
//! answers with a public URL that is stored on the product.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ImageHostConfig;
use crate::error::{ApiError, Result};

/// Client for the image host.
#[derive(Clone)]
pub struct ImageHost {
    inner: Arc<ImageHostInner>,
}

struct ImageHostInner {
    http: reqwest::Client,
    config: ImageHostConfig,
}

impl std::fmt::Debug for ImageHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHost")
            .field("config", &self.inner.config)
            .finish()
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    error: Option<UploadError>,
}

#[derive(Deserialize)]
struct UploadData {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct UploadError {
    #[serde(default)]
    message: Option<String>,
}

impl ImageHost {
    /// Create an image host client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ImageHostConfig) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(ImageHostInner {
                http,
                config: config.clone(),
            }),
        })
    }

    /// Upload raw image bytes and return the public URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ImageUpload` if the host refuses the image or the
    /// response carries no URL.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn upload(&self, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(ApiError::ImageUpload("no image selected".to_string()));
        }

        let mut url = Url::parse(&self.inner.config.upload_url)
            .map_err(|e| ApiError::ImageUpload(format!("invalid upload URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.config.api_key.expose_secret());

        let form = reqwest::multipart::Form::new().text("image", STANDARD.encode(bytes));
        let response = self.inner.http.post(url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed: Option<UploadResponse> = serde_json::from_str(&body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(ApiError::ImageUpload(message));
        }

        let image_url = parsed
            .and_then(|r| r.data)
            .and_then(|d| d.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::ImageUpload("response has no image URL".to_string()))?;

        debug!(url = %image_url, "Image uploaded");
        Ok(image_url)
    }
}
