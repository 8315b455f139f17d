//! Product request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopease_core::{Email, ProductId, RequestId, RequestStatus};

use super::common::lenient_timestamp;

/// Reference to the requested product.
///
/// Some endpoints return the bare key, others embed the product document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    Id(ProductId),
    Embedded {
        #[serde(rename = "_id")]
        id: ProductId,
        #[serde(default)]
        title: Option<String>,
    },
}

impl ProductRef {
    /// The referenced product's key, whichever form was sent.
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        match self {
            Self::Id(id) | Self::Embedded { id, .. } => id,
        }
    }
}

/// A user's request for a product to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(rename = "_id")]
    pub id: RequestId,
    pub product_id: ProductRef,
    #[serde(default)]
    pub product_title: Option<String>,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, with = "lenient_timestamp")]
    pub requested_at: Option<DateTime<Utc>>,
}

impl ProductRequest {
    /// Title from the request itself, or from the embedded product.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.product_title.as_deref().or(match &self.product_id {
            ProductRef::Embedded { title, .. } => title.as_deref(),
            ProductRef::Id(_) => None,
        })
    }
}

/// Body for `POST /product-requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProductRequest {
    pub product_id: ProductId,
    pub user_email: Email,
    /// Display name, or the email when the profile has none.
    pub user_name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_ref_both_forms() {
        let bare: ProductRequest = serde_json::from_value(json!({
            "_id": "q1", "productId": "p1", "status": "pending"
        }))
        .unwrap();
        assert_eq!(bare.product_id.id().as_str(), "p1");
        assert!(bare.title().is_none());

        let embedded: ProductRequest = serde_json::from_value(json!({
            "_id": "q2",
            "productId": {"_id": "p2", "title": "Honey"},
            "status": "delivered"
        }))
        .unwrap();
        assert_eq!(embedded.product_id.id().as_str(), "p2");
        assert_eq!(embedded.title(), Some("Honey"));
        assert_eq!(embedded.status, RequestStatus::Delivered);
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let request: ProductRequest =
            serde_json::from_value(json!({"_id": "q3", "productId": "p3"})).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert!(request.status.is_cancellable());
    }
}
