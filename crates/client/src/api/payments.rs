//! Payment endpoints.

use reqwest::Method;
use tracing::instrument;

use shopease_core::{Email, Page, Price};

use super::types::payment::{PaymentHistory, PaymentIntentRequest};
use super::types::{MutationAck, Payment, PaymentIntent};
use super::{Auth, ShopClient, segment};
use crate::error::{ApiError, Result};

impl ShopClient {
    /// Create a payment intent (`POST /create-payment-intent`).
    ///
    /// The amount is sent in cents.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Payment` if the amount does not fit in cents, or
    /// the backend failure.
    #[instrument(skip(self, amount, package_name, user_email), fields(package = package_name, amount = %amount))]
    pub async fn create_payment_intent(
        &self,
        amount: Price,
        package_name: &str,
        user_email: &Email,
    ) -> Result<PaymentIntent> {
        let cents = amount
            .to_cents()
            .ok_or_else(|| ApiError::Payment(format!("amount out of range: {amount}")))?;
        let builder = self
            .request(Method::POST, "/create-payment-intent", &[], Auth::None)?
            .json(&PaymentIntentRequest {
                amount: cents,
                package_name,
                user_email,
            });
        super::send(builder).await
    }

    /// Record a completed purchase (`POST /payments/save`).
    ///
    /// # Errors
    ///
    /// Returns the backend failure.
    #[instrument(skip(self, payment), fields(package = %payment.package_name))]
    pub async fn save_payment(&self, payment: &Payment) -> Result<MutationAck> {
        self.mutate(Method::POST, "/payments/save", Some(payment), Auth::None)
            .await
    }

    /// A user's purchase history (`GET /payments/{email}`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport, status, or parse failure.
    #[instrument(skip(self, email))]
    pub async fn payment_history(&self, email: &Email) -> Result<Page<Payment>> {
        let history: PaymentHistory = self
            .get(&format!("/payments/{}", segment(email.as_str())), &[], Auth::None)
            .await?;
        Ok(Page::single(history.payments))
    }
}
