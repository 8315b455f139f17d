//! Review types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopease_core::{Email, ProductId, ReviewId};

use super::common::{lenient_timestamp, null_as_default};

/// A user's review of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    /// Older documents stored the key as `ProductId`.
    #[serde(default, alias = "ProductId")]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: u64,
    /// Denormalized product title for the "my reviews" table.
    #[serde(default)]
    pub product_title: Option<String>,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Whether `email` wrote this review. Authors and admins may edit or
    /// delete; the admin half is decided by the caller's role.
    #[must_use]
    pub fn is_authored_by(&self, email: &Email) -> bool {
        self.user_email == email.as_str()
    }
}

/// Body for `POST /reviews`.
///
/// The backend reads the product key as `ProductId` (capital P).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    #[serde(rename = "ProductId")]
    pub product_id: ProductId,
    pub user_email: Email,
    pub user_name: String,
    pub comment: String,
}

/// Body for `PUT /reviews/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ReviewEdit<'a> {
    pub comment: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_review_accepts_legacy_product_key() {
        let review: Review = serde_json::from_value(json!({
            "_id": "r1",
            "ProductId": "p1",
            "userEmail": "a@x.io",
            "userName": "A",
            "comment": "Tasty",
            "createdAt": "2025-05-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(review.product_id, Some(ProductId::new("p1")));
        assert!(review.is_authored_by(&Email::parse("a@x.io").unwrap()));
        assert_eq!(review.likes, 0);
    }

    #[test]
    fn test_new_review_uses_capital_product_key() {
        let body = NewReview {
            product_id: ProductId::new("p9"),
            user_email: Email::parse("a@x.io").unwrap(),
            user_name: "A".to_string(),
            comment: "Nice".to_string(),
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["ProductId"], json!("p9"));
        assert_eq!(value["userEmail"], json!("a@x.io"));
        assert!(value.get("productId").is_none());
    }
}
