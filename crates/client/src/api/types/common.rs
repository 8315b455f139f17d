//! Shared response and timestamp types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Acknowledgement returned by create/update/delete endpoints.
///
/// Older endpoints answer with an arbitrary document and no `success` flag;
/// those are treated as accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationAck {
    /// Explicit success flag, when the endpoint sends one.
    #[serde(default)]
    pub success: Option<bool>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// ID of a newly inserted document.
    #[serde(default)]
    pub inserted_id: Option<String>,
}

impl MutationAck {
    /// Turn an explicit `success: false` into [`ApiError::Rejected`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` carrying the server message.
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.success == Some(false) {
            return Err(ApiError::Rejected {
                message: self.message,
            });
        }
        Ok(self)
    }
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

/// Parse a timestamp the way the backend stores them.
///
/// Documents carry RFC 3339 strings (`toISOString()`), naive form values
/// from `datetime-local` inputs (`2025-06-01T10:30`), or bare dates.
/// Naive values are taken as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter for optional, loosely formatted timestamps.
///
/// Unparseable values become `None` rather than failing the whole document.
pub mod lenient_timestamp {
    use super::{DateTime, Deserialize, Deserializer, Utc, parse_timestamp};

    /// Deserialize an optional timestamp, tolerating odd formats.
    ///
    /// # Errors
    ///
    /// Only fails when the underlying value is not a string or null.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse_timestamp))
    }

    /// Serialize as RFC 3339.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: serde::Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

/// Deserialize `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
