//! Shared Serde deserializers
//!
//! Custom deserializers for identifier fields in API requests. Callers of the
//! alarm mesh send ids both as JSON numbers and as strings, so these accept:
//! - `null` → None
//! - `""` (empty or blank string) → None
//! - String `"A1"` / `"123"` → Some(..)
//! - Native number `123` → Some(..)

use serde::{Deserialize, Deserializer};

// ============================================================================
// Default Value Functions (for serde #[serde(default = "...")] attributes)
// ============================================================================

/// Default value: true
pub fn bool_true() -> bool {
    true
}

/// Default value: false
pub fn bool_false() -> bool {
    false
}

// ============================================================================
// Custom Deserializers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    String(String),
    Int(i64),
    Null,
}

/// Deserialize an optional identifier as a string
///
/// Integers are rendered in decimal; strings are trimmed and blank strings
/// become `None`.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize)]
/// struct Request {
///     #[serde(default, deserialize_with = "deserialize_optional_id")]
///     alarm_id: Option<String>,
/// }
/// ```
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StringOrInt>::deserialize(deserializer)? {
        None | Some(StringOrInt::Null) => Ok(None),
        Some(StringOrInt::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        },
        Some(StringOrInt::Int(i)) => Ok(Some(i.to_string())),
    }
}

/// Deserialize optional i64
///
/// Supports the following input formats:
/// - `null` → `None`
/// - `""` → `None`
/// - `123` or `"123"` → `Some(123)`
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<StringOrInt>::deserialize(deserializer)? {
        None | Some(StringOrInt::Null) => Ok(None),
        Some(StringOrInt::String(s)) if s.trim().is_empty() => Ok(None),
        Some(StringOrInt::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid integer: {}", s))),
        Some(StringOrInt::Int(i)) => Ok(Some(i)),
    }
}

/// Deserialize a required i64 given either as a number or a numeric string
pub fn deserialize_i64_flexible<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    deserialize_optional_i64(deserializer)?
        .ok_or_else(|| D::Error::custom("expected an integer, found null or empty string"))
}
