//! Client-side form validation.
//!
//! These checks run before a request is built. They exist so the user gets
//! an inline message without a round trip; the backend repeats whatever
//! checks it needs.

use thiserror::Error;

use shopease_core::Price;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is blank.
    #[error("Please fill in {0}")]
    MissingField(&'static str),

    /// A price that must be positive is zero.
    #[error("Price must be positive")]
    NonPositivePrice,

    /// The review comment is blank.
    #[error("Review cannot be empty")]
    EmptyComment,

    /// The password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    /// The password has no uppercase letter.
    #[error("At least one uppercase letter required")]
    PasswordMissingUppercase,

    /// The password has no lowercase letter.
    #[error("At least one lowercase letter required")]
    PasswordMissingLowercase,

    /// A value could not be parsed.
    #[error("Invalid {field}: {reason}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Parser message.
        reason: String,
    },
}

/// Fail with [`ValidationError::MissingField`] when `value` is blank.
///
/// # Errors
///
/// Returns an error naming `field` if `value` is empty after trimming.
pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Fail when a price that must be strictly positive is zero.
///
/// # Errors
///
/// Returns [`ValidationError::NonPositivePrice`] for a zero price.
pub fn require_positive(price: Price) -> Result<(), ValidationError> {
    if !price.is_positive() {
        return Err(ValidationError::NonPositivePrice);
    }
    Ok(())
}

/// Trim a review comment and reject it if nothing remains.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyComment`] for a blank comment.
pub fn review_comment(comment: &str) -> Result<String, ValidationError> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(trimmed.to_string())
}

/// Registration password rules: an uppercase letter, a lowercase letter,
/// and at least [`MIN_PASSWORD_LENGTH`] characters, checked in that order.
///
/// # Errors
///
/// Returns the first rule the password breaks.
pub fn password(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(char::is_uppercase) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}
