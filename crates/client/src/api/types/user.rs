//! User and admin profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopease_core::{Badge, Email, Role, UserId};

use super::common::{lenient_timestamp, null_as_default};

/// A shopper or admin account, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: Option<UserId>,
    pub email: Email,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    /// Missing or null means a regular user.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    /// Missing or null means Bronze.
    #[serde(default, deserialize_with = "null_as_default")]
    pub badge: Badge,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Name shown next to reviews and requests.
    #[must_use]
    pub fn name_or_email(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Body for `POST /users/upsert`, sent after every sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpsert {
    pub email: Email,
    pub display_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

/// Admin dashboard profile from `GET /admin/profile/{email}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Free-form role label (`"Admin"`, `"SuperAdmin"`).
    #[serde(default)]
    pub role: Option<String>,
    /// Dashboard counters and anything else the backend adds.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
