//! Role, tier, and status enums.
//!
//! `Role` and `Badge` are advisory on the client. They drive navigation and
//! button visibility only; the backend is responsible for enforcing any
//! privilege they imply.

use serde::{Deserialize, Serialize};

/// Account role as stored on the user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular shopper. Also the fallback when a lookup fails.
    #[default]
    User,
    /// Store administrator.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Purchased membership tier.
///
/// Every account starts at `Bronze`; the paid tiers are bought through the
/// membership checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Badge {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Badge {
    /// Paid tiers unlock liking upcoming products.
    #[must_use]
    pub const fn is_premium(self) -> bool {
        matches!(self, Self::Silver | Self::Gold | Self::Platinum)
    }

    /// Display name, as stored on the user document.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Badge {
    type Err = String;

    /// Case-insensitive so that package keys (`"gold"`) and badge names
    /// (`"Gold"`) both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            _ => Err(format!("invalid badge: {s}")),
        }
    }
}

/// Lifecycle of a product request.
///
/// Requests start `Pending`; an admin serving the request moves it to
/// `Delivered`. Users may cancel only while pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Pending,
    Delivered,
}

impl RequestStatus {
    /// Whether the requesting user may still cancel.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Outcome recorded on a payment document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_badge_premium() {
        assert!(!Badge::Bronze.is_premium());
        assert!(Badge::Silver.is_premium());
        assert!(Badge::Gold.is_premium());
        assert!(Badge::Platinum.is_premium());
    }

    #[test]
    fn test_badge_serde_uses_display_names() {
        assert_eq!(serde_json::to_string(&Badge::Gold).unwrap(), "\"Gold\"");
        let badge: Badge = serde_json::from_str("\"Platinum\"").unwrap();
        assert_eq!(badge, Badge::Platinum);
    }

    #[test]
    fn test_badge_from_package_key() {
        assert_eq!("silver".parse::<Badge>().unwrap(), Badge::Silver);
        assert_eq!("Gold".parse::<Badge>().unwrap(), Badge::Gold);
    }

    #[test]
    fn test_request_status() {
        let status: RequestStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(status, RequestStatus::Delivered);
        assert!(RequestStatus::Pending.is_cancellable());
        assert!(!RequestStatus::Delivered.is_cancellable());
    }

    #[test]
    fn test_payment_status() {
        let status: PaymentStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(status, PaymentStatus::Succeeded);
    }
}
