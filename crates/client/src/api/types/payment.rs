//! Payment and membership types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopease_core::{Email, PaymentId, PaymentStatus};

use super::common::lenient_timestamp;

/// A completed (or failed) membership purchase. Read-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PaymentId>,
    pub user_email: String,
    /// Package key (`"silver"`, `"gold"`, `"platinum"`).
    pub package_name: String,
    pub payment_intent_id: String,
    /// Amount in currency units, not cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: PaymentStatus,
    /// `None` when the stored value is missing or unparseable.
    #[serde(default, with = "lenient_timestamp")]
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Body for `POST /create-payment-intent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentIntentRequest<'a> {
    /// Amount in cents.
    pub amount: i64,
    pub package_name: &'a str,
    pub user_email: &'a Email,
}

/// Response of `POST /create-payment-intent`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    /// Secret handed to the payment processor to confirm the intent.
    pub client_secret: String,
}

/// Envelope of `GET /payments/{email}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PaymentHistory {
    #[serde(default)]
    pub payments: Vec<Payment>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    #[test]
    fn test_payment_roundtrip_fields() {
        let payment: Payment = serde_json::from_value(json!({
            "_id": "pay1",
            "userEmail": "a@x.io",
            "packageName": "gold",
            "paymentIntentId": "pi_123",
            "amount": 29.99,
            "status": "succeeded",
            "purchasedAt": "2025-06-01T12:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(payment.amount, Decimal::from_str("29.99").unwrap());
        assert_eq!(payment.status, PaymentStatus::Succeeded);
        assert!(payment.purchased_at.is_some());

        let value = serde_json::to_value(&payment).unwrap();
        assert_eq!(value["amount"], json!(29.99));
        assert_eq!(value["paymentIntentId"], json!("pi_123"));
    }

    #[test]
    fn test_history_tolerates_bad_timestamps() {
        let history: PaymentHistory = serde_json::from_value(json!({
            "payments": [
                {
                    "userEmail": "a@x.io",
                    "packageName": "silver",
                    "paymentIntentId": "pi_1",
                    "amount": 19.99,
                    "status": "succeeded",
                    "purchasedAt": "last tuesday"
                },
                {
                    "userEmail": "a@x.io",
                    "packageName": "gold",
                    "paymentIntentId": "pi_2",
                    "amount": 29.99,
                    "status": "succeeded"
                }
            ]
        }))
        .unwrap();
        assert_eq!(history.payments.len(), 2);
        assert!(history.payments.iter().all(|p| p.purchased_at.is_none()));
    }

    #[test]
    fn test_history_defaults_to_empty() {
        let history: PaymentHistory = serde_json::from_value(json!({})).unwrap();
        assert!(history.payments.is_empty());
    }
}
