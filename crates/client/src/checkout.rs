//! Membership checkout.
//!
//! Card details never pass through this crate. The flow creates a payment
//! intent on the backend, hands its client secret to a [`PaymentConfirmer`]
//! (the payment widget), and records the purchase when the processor
//! reports success.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

use shopease_core::{Badge, Email, PaymentStatus, Price};

use crate::api::ShopClient;
use crate::api::types::Payment;
use crate::error::{ApiError, Result};
use crate::identity::Identity;

/// Paid membership tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipPackage {
    Silver,
    Gold,
    Platinum,
}

impl MembershipPackage {
    pub const ALL: [Self; 3] = [Self::Silver, Self::Gold, Self::Platinum];

    /// Lowercase key sent to the backend.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        }
    }

    #[must_use]
    pub fn price(self) -> Price {
        Price::from_unsigned_cents(match self {
            Self::Silver => 1999,
            Self::Gold => 2999,
            Self::Platinum => 4999,
        })
    }

    /// Badge granted by the purchase.
    #[must_use]
    pub const fn badge(self) -> Badge {
        match self {
            Self::Silver => Badge::Silver,
            Self::Gold => Badge::Gold,
            Self::Platinum => Badge::Platinum,
        }
    }
}

impl fmt::Display for MembershipPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.badge().as_str())
    }
}

impl FromStr for MembershipPackage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("invalid package: {s}"))
    }
}

/// Billing details passed to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingDetails {
    pub name: String,
    pub email: Email,
}

impl BillingDetails {
    /// Billing details for a signed-in identity; the name defaults to
    /// `"User"`.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            name: identity
                .display_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "User".to_string()),
            email: identity.email.clone(),
        }
    }
}

/// What the processor reported for a confirmed intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentOutcome {
    pub id: String,
    /// Processor status string (`succeeded`, `processing`, ...).
    pub status: String,
}

impl PaymentIntentOutcome {
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

/// Confirms a payment intent with the payment processor.
#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    /// Confirm the intent identified by `client_secret`.
    ///
    /// Card errors are reported as `ApiError::Payment` with the
    /// processor's message.
    async fn confirm(&self, client_secret: &str, billing: &BillingDetails) -> Result<PaymentIntentOutcome>;
}

/// Successful purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub payment_intent_id: String,
    pub package: MembershipPackage,
    /// The user's badge after the purchase.
    pub badge: Badge,
}

/// Buy a membership package for the signed-in identity.
///
/// # Errors
///
/// Returns `ApiError::Payment` when the processor does not report success,
/// or the backend failure from creating the intent or saving the payment.
#[instrument(skip_all, fields(package = package.key()))]
pub async fn purchase_membership(
    client: &ShopClient,
    confirmer: &dyn PaymentConfirmer,
    identity: &Identity,
    package: MembershipPackage,
) -> Result<Receipt> {
    let price = package.price();
    let intent = client
        .create_payment_intent(price, package.key(), &identity.email)
        .await?;

    let billing = BillingDetails::for_identity(identity);
    let outcome = confirmer.confirm(&intent.client_secret, &billing).await?;

    if !outcome.is_succeeded() {
        warn!(status = %outcome.status, "Payment not completed");
        return Err(ApiError::Payment(format!("payment {}", outcome.status)));
    }

    let payment = Payment {
        id: None,
        user_email: identity.email.as_str().to_string(),
        package_name: package.key().to_string(),
        payment_intent_id: outcome.id.clone(),
        amount: price.amount(),
        status: PaymentStatus::Succeeded,
        purchased_at: Some(Utc::now()),
    };
    client.save_payment(&payment).await?;

    info!(payment_intent_id = %outcome.id, "Membership purchased");
    Ok(Receipt {
        payment_intent_id: outcome.id,
        package,
        badge: package.badge(),
    })
}
