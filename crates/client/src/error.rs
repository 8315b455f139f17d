//! Unified error type for client operations.
//!
//! Every remote call returns `Result<T, ApiError>`. Callers that only need
//! a notification string use [`ApiError::user_message`], which surfaces the
//! server's own message when it sent one and a caller-supplied fallback
//! otherwise. Structured codes are never shown to the user.

use thiserror::Error;

use crate::identity::IdentityError;
use crate::likes::LikeRejection;
use crate::validation::ValidationError;

/// Errors that can occur when talking to the ShopEase backend or its
/// collaborators.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input failed client-side validation; nothing was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A like was refused client-side; nothing was sent.
    #[error("Like rejected: {0}")]
    Like(#[from] LikeRejection),

    /// The operation needs a signed-in identity.
    #[error("Not signed in")]
    NotSignedIn,

    /// Transport failure (connect, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Authentication or authorization failure (401/403).
    #[error("Unauthorized ({status})")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// Non-success status with an optional server message.
    #[error("Server error {status}: {}", message.as_deref().unwrap_or("(no message)"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// Successful status but the body reported `success: false`.
    #[error("Request rejected: {}", message.as_deref().unwrap_or("(no message)"))]
    Rejected {
        /// Server-provided message, if any.
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Identity provider failure.
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Image host failure.
    #[error("Image upload failed: {0}")]
    ImageUpload(String),

    /// Payment processor failure or a non-succeeded payment.
    #[error("Payment failed: {0}")]
    Payment(String),

    /// An optional integration was used without configuration.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ApiError {
    /// The message the server attached to the failure, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }

    /// Text suitable for a dismissible notification.
    ///
    /// Server messages are passed through verbatim. Client-side rejections
    /// carry their own wording. Everything else becomes `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(message) = self.server_message()
            && !message.trim().is_empty()
        {
            return message.to_string();
        }

        match self {
            Self::Validation(err) => err.to_string(),
            Self::Like(rejection) => rejection.to_string(),
            Self::NotSignedIn => "Please login to continue".to_string(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the failure is an authorization failure, which callers turn
    /// into a redirect to the unauthorized view.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotSignedIn)
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
