//! Unified error classification for alarm mesh services
//!
//! Every service error type implements [`ServiceErrorTrait`] so that HTTP
//! status mapping, error codes, retry hints and log levels are decided in one
//! place instead of per handler.

use serde::Serialize;

/// Error category
///
/// Coarse classification used for HTTP status mapping, retry decisions and
/// log level selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    // Infrastructure layer
    Configuration,
    Upstream,
    Timeout,

    // Request layer
    Validation,
    NotFound,
    Permission,

    // System level
    Internal,
}

impl ErrorCategory {
    /// Stable lowercase name, as serialized in error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Upstream => "upstream",
            ErrorCategory::Timeout => "timeout",
            ErrorCategory::Validation => "validation",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared error behavior for service error types
///
/// Implementors only provide [`error_code`](Self::error_code) and
/// [`category`](Self::category); the remaining methods derive from the
/// category and may be overridden where a variant needs finer control.
pub trait ServiceErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for API, logs, monitoring)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Whether the caller may retry the same request
    fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Upstream | ErrorCategory::Timeout
        )
    }

    /// Recommended retry delay in milliseconds
    fn retry_delay_ms(&self) -> u64 {
        match self.category() {
            ErrorCategory::Upstream => 1000,
            ErrorCategory::Timeout => 500,
            _ => 0,
        }
    }

    /// Convert to HTTP status code
    ///
    /// Upstream and timeout failures surface as 500 because the failing
    /// party is a collaborator, not this service's own availability.
    #[cfg(feature = "axum-support")]
    fn http_status(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Permission => StatusCode::FORBIDDEN,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Configuration
            | ErrorCategory::Upstream
            | ErrorCategory::Timeout
            | ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert into an Axum HTTP response
    #[cfg(feature = "axum-support")]
    #[allow(clippy::disallowed_methods)] // json! macro internally uses unwrap (safe for known valid JSON)
    fn into_http_response(self) -> axum::response::Response
    where
        Self: Sized,
    {
        use axum::response::{IntoResponse, Json};
        use serde_json::json;

        (
            self.http_status(),
            Json(json!({
                "success": false,
                "error": {
                    "code": self.http_status().as_u16(),
                    "error_code": self.error_code(),
                    "message": self.to_string(),
                    "category": self.category(),
                    "retryable": self.is_retryable(),
                    "retry_delay_ms": self.retry_delay_ms(),
                },
            })),
        )
            .into_response()
    }

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Internal | ErrorCategory::Configuration => Level::ERROR,
            ErrorCategory::Upstream | ErrorCategory::Timeout => Level::WARN,
            ErrorCategory::Validation | ErrorCategory::NotFound | ErrorCategory::Permission => {
                Level::INFO
            },
        }
    }

    /// Whether an operator alert should be raised
    fn should_alert(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Internal | ErrorCategory::Configuration
        )
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum ProbeError {
        #[error("bad input")]
        BadInput,
        #[error("registry down")]
        RegistryDown,
        #[error("forbidden")]
        Forbidden,
    }

    impl ServiceErrorTrait for ProbeError {
        fn error_code(&self) -> &'static str {
            match self {
                ProbeError::BadInput => "PROBE_BAD_INPUT",
                ProbeError::RegistryDown => "PROBE_REGISTRY_DOWN",
                ProbeError::Forbidden => "PROBE_FORBIDDEN",
            }
        }

        fn category(&self) -> ErrorCategory {
            match self {
                ProbeError::BadInput => ErrorCategory::Validation,
                ProbeError::RegistryDown => ErrorCategory::Upstream,
                ProbeError::Forbidden => ErrorCategory::Permission,
            }
        }
    }

    #[test]
    fn test_retryable_follows_category() {
        assert!(!ProbeError::BadInput.is_retryable());
        assert!(ProbeError::RegistryDown.is_retryable());
        assert_eq!(ProbeError::RegistryDown.retry_delay_ms(), 1000);
        assert_eq!(ProbeError::Forbidden.retry_delay_ms(), 0);
    }

    #[test]
    fn test_log_level_and_alerting() {
        assert_eq!(ProbeError::BadInput.log_level(), tracing::Level::INFO);
        assert_eq!(ProbeError::RegistryDown.log_level(), tracing::Level::WARN);
        assert!(!ProbeError::RegistryDown.should_alert());
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(
            serde_json::to_value(ErrorCategory::NotFound).unwrap(),
            serde_json::json!("not_found")
        );
        assert_eq!(ErrorCategory::Permission.to_string(), "permission");
    }

    #[cfg(feature = "axum-support")]
    #[test]
    fn test_http_status_mapping() {
        use axum::http::StatusCode;
        assert_eq!(ProbeError::BadInput.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(ProbeError::Forbidden.http_status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ProbeError::RegistryDown.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
