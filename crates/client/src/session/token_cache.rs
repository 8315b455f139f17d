//! Short-lived ID token cache.
//!
//! Holds the last ID token per email for up to seven days, so that callers
//! outside the session (the CLI, background tasks) can attach a bearer token
//! without holding the identity. The identity provider's session stays
//! authoritative; a cache miss just means "no token".

use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};

use shopease_core::Email;

/// Token lifetime in the cache.
pub const TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const MAX_ENTRIES: u64 = 1_000;

/// ID tokens keyed by email.
#[derive(Clone)]
pub struct TokenCache {
    cache: Cache<String, SecretString>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::with_ttl(TOKEN_TTL)
    }
}

impl TokenCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache with a custom time-to-live.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    pub async fn store(&self, email: &Email, token: &str) {
        self.cache
            .insert(email.as_str().to_string(), SecretString::from(token.to_string()))
            .await;
    }

    /// The cached token for `email`, if still live.
    pub async fn token(&self, email: &Email) -> Option<String> {
        self.cache
            .get(email.as_str())
            .await
            .map(|secret| secret.expose_secret().to_string())
    }

    pub async fn invalidate(&self, email: &Email) {
        self.cache.invalidate(email.as_str()).await;
    }
}
