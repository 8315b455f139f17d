//! Likes with client-side checks and optimistic updates.
//!
//! Both product and upcoming-product likes follow the same policy:
//!
//! 1. Refuse without sending anything when nobody is signed in, when the
//!    badge is not premium (upcoming products only), or when the email is
//!    already in `likedBy`.
//! 2. Apply the like locally (`likes + 1`, email appended).
//! 3. Send the request; on any failure restore the exact previous value.
//!
//! The badge check is a display rule only. The backend enforces its own.

use thiserror::Error;
use tracing::{debug, instrument, warn};

use shopease_core::{Badge, Email};

use crate::api::ShopClient;
use crate::api::types::{MutationAck, Product, UpcomingProduct};
use crate::error::Result;
use crate::identity::Identity;

/// Why a like was refused before any request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LikeRejection {
    #[error("Please login to like products")]
    NotSignedIn,
    #[error("Only premium users can like products")]
    PremiumRequired,
    #[error("You already liked this product")]
    AlreadyLiked,
}

/// Check a product like.
///
/// # Errors
///
/// Returns the first rule that refuses the like.
pub fn check_product_like<'a>(
    product: &Product,
    identity: Option<&'a Identity>,
) -> std::result::Result<&'a Email, LikeRejection> {
    let identity = identity.ok_or(LikeRejection::NotSignedIn)?;
    if product.is_liked_by(&identity.email) {
        return Err(LikeRejection::AlreadyLiked);
    }
    Ok(&identity.email)
}

/// Check an upcoming-product like: sign-in, then badge, then duplicates.
///
/// # Errors
///
/// Returns the first rule that refuses the like.
pub fn check_upcoming_like<'a>(
    upcoming: &UpcomingProduct,
    identity: Option<&'a Identity>,
    badge: Badge,
) -> std::result::Result<&'a Email, LikeRejection> {
    let identity = identity.ok_or(LikeRejection::NotSignedIn)?;
    if !badge.is_premium() {
        return Err(LikeRejection::PremiumRequired);
    }
    if upcoming.product.is_liked_by(&identity.email) {
        return Err(LikeRejection::AlreadyLiked);
    }
    Ok(&identity.email)
}

fn apply_like(product: &mut Product, email: &Email) {
    product.likes = product.likes.saturating_add(1);
    product.liked_by.push(email.as_str().to_string());
}

/// Like a product, updating `product` in place.
///
/// # Errors
///
/// Returns `ApiError::Like` without sending anything when refused, or the
/// backend failure after rolling `product` back.
#[instrument(skip_all, fields(product_id = %product.id))]
pub async fn like_product(
    client: &ShopClient,
    product: &mut Product,
    identity: Option<&Identity>,
) -> Result<MutationAck> {
    let email = check_product_like(product, identity)?;

    let before = product.clone();
    apply_like(product, email);

    match client.send_product_like(&product.id, email).await {
        Ok(ack) => {
            debug!(likes = product.likes, "Product liked");
            Ok(ack)
        }
        Err(e) => {
            warn!(error = %e, "Like failed, rolling back");
            *product = before;
            Err(e)
        }
    }
}

/// Like an upcoming product, updating `upcoming` in place.
///
/// `badge` is the signed-in user's membership badge.
///
/// # Errors
///
/// Returns `ApiError::Like` without sending anything when refused, or the
/// backend failure after rolling `upcoming` back.
#[instrument(skip_all, fields(product_id = %upcoming.product.id, badge = %badge))]
pub async fn like_upcoming(
    client: &ShopClient,
    upcoming: &mut UpcomingProduct,
    identity: Option<&Identity>,
    badge: Badge,
) -> Result<MutationAck> {
    let email = check_upcoming_like(upcoming, identity, badge)?;
    let token = identity.map_or("", Identity::id_token);

    let before = upcoming.clone();
    apply_like(&mut upcoming.product, email);

    match client.send_upcoming_like(&upcoming.product.id, email, token).await {
        Ok(ack) => {
            debug!(likes = upcoming.product.likes, "Upcoming product liked");
            Ok(ack)
        }
        Err(e) => {
            warn!(error = %e, "Like failed, rolling back");
            *upcoming = before;
            Err(e)
        }
    }
}
