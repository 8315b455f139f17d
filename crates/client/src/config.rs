//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SHOPEASE_API_BASE_URL` - Backend REST API base URL
//!   (default: `https://online-shop-server-side.vercel.app`)
//! - `FIREBASE_API_KEY` - Identity provider web API key (sign-in disabled when unset)
//! - `IMGBB_API_KEY` - Image host API key (image upload disabled when unset)
//! - `SHOPEASE_SEARCH_DEBOUNCE_MS` - Quiet period before a search refresh (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default backend deployment.
pub const DEFAULT_API_BASE_URL: &str = "https://online-shop-server-side.vercel.app";

/// Default search debounce, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend REST API settings
    pub api: ApiConfig,
    /// Identity provider settings, if sign-in is enabled
    pub identity: Option<IdentityConfig>,
    /// Image host settings, if uploads are enabled
    pub image_host: Option<ImageHostConfig>,
    /// Quiet period applied to search-driven list refreshes, see
    /// [`Debouncer::from_config`](crate::debounce::Debouncer::from_config)
    pub search_debounce: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend REST API settings.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, without a trailing slash
    pub base_url: Url,
    /// Value for the `User-Agent` header
    pub user_agent: String,
}

/// Identity provider settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Web API key
    pub api_key: SecretString,
    /// Identity Toolkit endpoint root
    pub identity_toolkit_url: String,
    /// Secure token endpoint root
    pub secure_token_url: String,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &"[REDACTED]")
            .field("identity_toolkit_url", &self.identity_toolkit_url)
            .field("secure_token_url", &self.secure_token_url)
            .finish()
    }
}

/// Image host settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ImageHostConfig {
    /// Upload API key
    pub api_key: SecretString,
    /// Upload endpoint
    pub upload_url: String,
}

impl std::fmt::Debug for ImageHostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHostConfig")
            .field("api_key", &"[REDACTED]")
            .field("upload_url", &self.upload_url)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api = ApiConfig::new(&get_env_or_default(
            "SHOPEASE_API_BASE_URL",
            DEFAULT_API_BASE_URL,
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("SHOPEASE_API_BASE_URL".to_string(), e))?;

        let identity = get_optional_env("FIREBASE_API_KEY").map(IdentityConfig::new);
        let image_host = get_optional_env("IMGBB_API_KEY").map(ImageHostConfig::new);

        let debounce_ms = get_env_or_default(
            "SHOPEASE_SEARCH_DEBOUNCE_MS",
            &DEFAULT_DEBOUNCE_MS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPEASE_SEARCH_DEBOUNCE_MS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api,
            identity,
            image_host,
            search_debounce: Duration::from_millis(debounce_ms),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at an explicit backend, with every optional
    /// integration disabled.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an absolute http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let api = ApiConfig::new(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("base_url".to_string(), e))?;
        Ok(Self {
            api,
            identity: None,
            image_host: None,
            search_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            sentry_dsn: None,
            sentry_environment: None,
        })
    }
}

impl ApiConfig {
    /// Validate and normalize a base URL.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str) -> Result<Self, String> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed).map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme: {}", url.scheme()));
        }
        Ok(Self {
            base_url: url,
            user_agent: format!("shopease-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Join an API path (starting with `/`) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        )
    }
}

impl IdentityConfig {
    /// Settings for the hosted identity endpoints.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: SecretString::from(api_key),
            identity_toolkit_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            secure_token_url: "https://securetoken.googleapis.com/v1".to_string(),
        }
    }
}

impl ImageHostConfig {
    /// Settings for the hosted image upload endpoint.
    #[must_use]
    pub fn new(api_key: String) -> Self {
        Self {
            api_key: SecretString::from(api_key),
            upload_url: "https://api.imgbb.com/1/upload".to_string(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}
