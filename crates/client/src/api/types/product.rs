//! Product and upcoming-product types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopease_core::{Email, Price, ProductId};

use super::common::{lenient_timestamp, null_as_default};
use crate::validation::{self, ValidationError};

/// A published catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    /// Enum-like category string (e.g. `"Snacks"`).
    #[serde(default)]
    pub category: String,
    /// Public image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default, with = "lenient_timestamp")]
    pub post_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub distributor_name: Option<String>,
    #[serde(default)]
    pub added_by_email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likes: u64,
    /// Emails of users who liked the product.
    #[serde(default, deserialize_with = "null_as_default")]
    pub liked_by: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_count: u64,
    /// Average rating, 0-5.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
}

impl Product {
    /// Rating clamped into the 0-5 display range.
    #[must_use]
    pub fn display_rating(&self) -> f64 {
        self.rating.clamp(0.0, 5.0)
    }

    /// Whether `email` already liked this product.
    #[must_use]
    pub fn is_liked_by(&self, email: &Email) -> bool {
        email.is_listed_in(&self.liked_by)
    }
}

/// A product announced ahead of publication.
///
/// Publishing promotes it into the product collection server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingProduct {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default, with = "lenient_timestamp")]
    pub publish_date: Option<DateTime<Utc>>,
}

/// Body for `POST /products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub title: String,
    pub category: String,
    pub image: String,
    pub ingredients: String,
    pub description: String,
    pub price: Price,
    #[serde(with = "lenient_timestamp")]
    pub post_time: Option<DateTime<Utc>>,
    pub distributor_name: String,
    pub added_by_email: Email,
}

impl NewProduct {
    /// Required-field check run before submission.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("title", &self.title)?;
        validation::require("category", &self.category)?;
        validation::require("image", &self.image)?;
        validation::require("ingredients", &self.ingredients)?;
        validation::require("description", &self.description)?;
        Ok(())
    }
}

/// Body for `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub title: String,
    pub category: String,
    pub image: String,
    pub ingredients: String,
    pub description: String,
    pub price: Price,
    #[serde(with = "lenient_timestamp")]
    pub post_time: Option<DateTime<Utc>>,
    /// Editing admin; the backend records who last touched the product.
    pub added_by_email: Email,
}

impl ProductUpdate {
    /// Pre-fill an edit form from the current product.
    #[must_use]
    pub fn from_product(product: &Product, editor: Email) -> Self {
        Self {
            title: product.title.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            ingredients: product.ingredients.clone(),
            description: product.description.clone(),
            price: product.price,
            post_time: product.post_time,
            added_by_email: editor,
        }
    }

    /// Required-field check run before submission.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("title", &self.title)?;
        validation::require("category", &self.category)?;
        validation::require("image", &self.image)?;
        validation::require("description", &self.description)?;
        Ok(())
    }
}

/// Body for `POST /upcoming-products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpcomingProduct {
    pub title: String,
    pub category: String,
    pub image: String,
    pub ingredients: String,
    pub description: String,
    pub price: Price,
    #[serde(with = "lenient_timestamp")]
    pub publish_date: Option<DateTime<Utc>>,
    pub distributor_name: String,
}

impl NewUpcomingProduct {
    /// Every field is required and the price must be positive.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require("title", &self.title)?;
        validation::require("category", &self.category)?;
        validation::require("image", &self.image)?;
        validation::require("ingredients", &self.ingredients)?;
        validation::require("description", &self.description)?;
        validation::require("distributorName", &self.distributor_name)?;
        if self.publish_date.is_none() {
            return Err(ValidationError::MissingField("publishDate"));
        }
        validation::require_positive(self.price)
    }
}

/// Body for `POST /upcoming-products/publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublishRequest<'a> {
    pub product_id: &'a ProductId,
    pub added_by_email: &'a Email,
}

/// Body for the like endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikeRequest<'a> {
    pub user_email: &'a Email,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_json() -> serde_json::Value {
        json!({
            "_id": "p1",
            "title": "Dried Mango",
            "category": "Snacks",
            "image": "https://i.ibb.co/x/mango.jpg",
            "description": "Sweet",
            "ingredients": "Mango",
            "price": 12.5,
            "postTime": "2025-06-01T10:30",
            "distributorName": "Tropic Co",
            "addedByEmail": "admin@shop.io",
            "likes": 3,
            "likedBy": ["a@x.io", "b@x.io", "c@x.io"],
            "reviewCount": 2,
            "rating": 4.5
        })
    }

    #[test]
    fn test_product_deserialize() {
        let product: Product = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.price, Price::parse("12.50").unwrap());
        assert!(product.post_time.is_some());
        assert_eq!(product.likes, 3);
        assert!(product.is_liked_by(&Email::parse("b@x.io").unwrap()));
    }

    #[test]
    fn test_product_tolerates_missing_and_null_fields() {
        let product: Product =
            serde_json::from_value(json!({"_id": "p2", "likes": null, "likedBy": null})).unwrap();
        assert_eq!(product.likes, 0);
        assert!(product.liked_by.is_empty());
        assert_eq!(product.price, Price::ZERO);
        assert!(product.post_time.is_none());
    }

    #[test]
    fn test_product_bad_post_time_is_none() {
        let mut value = sample_json();
        value["postTime"] = json!("not a date");
        let product: Product = serde_json::from_value(value).unwrap();
        assert!(product.post_time.is_none());
    }

    #[test]
    fn test_display_rating_clamped() {
        let mut value = sample_json();
        value["rating"] = json!(7.2);
        let product: Product = serde_json::from_value(value).unwrap();
        assert!((product.display_rating() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_upcoming_product_flattens() {
        let mut value = sample_json();
        value["publishDate"] = json!("2025-07-01");
        let upcoming: UpcomingProduct = serde_json::from_value(value).unwrap();
        assert_eq!(upcoming.product.title, "Dried Mango");
        assert!(upcoming.publish_date.is_some());
    }

    #[test]
    fn test_new_product_serializes_camel_case() {
        let new = NewProduct {
            title: "Tea".to_string(),
            category: "Drinks".to_string(),
            image: "https://img/tea.png".to_string(),
            ingredients: "Leaves".to_string(),
            description: "Green".to_string(),
            price: Price::parse("4.75").unwrap(),
            post_time: None,
            distributor_name: "Admin".to_string(),
            added_by_email: Email::parse("admin@shop.io").unwrap(),
        };
        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["price"], json!(4.75));
        assert_eq!(value["addedByEmail"], json!("admin@shop.io"));
        assert_eq!(value["distributorName"], json!("Admin"));
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_new_upcoming_validation() {
        let mut new = NewUpcomingProduct {
            title: "Kombucha".to_string(),
            category: "Drinks".to_string(),
            image: "https://img/k.png".to_string(),
            ingredients: "Tea".to_string(),
            description: "Fizzy".to_string(),
            price: Price::ZERO,
            publish_date: None,
            distributor_name: "Brew".to_string(),
        };
        assert_eq!(
            new.validate(),
            Err(ValidationError::MissingField("publishDate"))
        );
        new.publish_date = Some(Utc::now());
        assert_eq!(new.validate(), Err(ValidationError::NonPositivePrice));
        new.price = Price::parse("3").unwrap();
        assert!(new.validate().is_ok());
    }
}
