//! Error handling for Event Orchestration Service
//!
//! `EventSrvError` is the taxonomy the orchestrator surfaces to callers.
//! Partial dispatch failures are not errors; they are reported inside
//! [`OrchestrationResult`](crate::orchestrator::OrchestrationResult).

use errors::{ErrorCategory, ServiceErrorTrait};
use thiserror::Error;

use crate::collaborators::CollaboratorError;
use crate::event::{AlarmId, UserId};

/// Event Orchestration Service Error Type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventSrvError {
    /// Missing or malformed request fields, rejected before any remote call
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Actor is not among the alarm's recipients
    #[error("User {actor} is not authorized for alarm {alarm_id}")]
    NotAuthorized { actor: UserId, alarm_id: AlarmId },

    /// The alarm registry does not know the alarm
    #[error("Alarm not found: {0}")]
    RecipientNotFound(AlarmId),

    /// A collaborator could not be reached or answered with an error
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Invalid service configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for Event Orchestration Service
pub type Result<T> = std::result::Result<T, EventSrvError>;

impl EventSrvError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EventSrvError::ValidationError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        EventSrvError::ConfigError(msg.into())
    }

    pub fn not_authorized(actor: UserId, alarm_id: AlarmId) -> Self {
        EventSrvError::NotAuthorized { actor, alarm_id }
    }

    pub fn alarm_not_found(alarm_id: AlarmId) -> Self {
        EventSrvError::RecipientNotFound(alarm_id)
    }
}

impl From<CollaboratorError> for EventSrvError {
    fn from(err: CollaboratorError) -> Self {
        EventSrvError::UpstreamUnavailable(err.to_string())
    }
}

impl From<figment::Error> for EventSrvError {
    fn from(err: figment::Error) -> Self {
        EventSrvError::ConfigError(format!("Failed to parse config: {}", err))
    }
}

impl ServiceErrorTrait for EventSrvError {
    fn error_code(&self) -> &'static str {
        match self {
            EventSrvError::ValidationError(_) => "EVENTSRV_VALIDATION",
            EventSrvError::NotAuthorized { .. } => "EVENTSRV_NOT_AUTHORIZED",
            EventSrvError::RecipientNotFound(_) => "EVENTSRV_RECIPIENT_NOT_FOUND",
            EventSrvError::UpstreamUnavailable(_) => "EVENTSRV_UPSTREAM_UNAVAILABLE",
            EventSrvError::ConfigError(_) => "EVENTSRV_CONFIG",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            EventSrvError::ValidationError(_) => ErrorCategory::Validation,
            EventSrvError::NotAuthorized { .. } => ErrorCategory::Permission,
            EventSrvError::RecipientNotFound(_) => ErrorCategory::NotFound,
            EventSrvError::UpstreamUnavailable(_) => ErrorCategory::Upstream,
            EventSrvError::ConfigError(_) => ErrorCategory::Configuration,
        }
    }
}

// Convert EventSrvError to AppError for HTTP responses
impl From<EventSrvError> for common::AppError {
    fn from(err: EventSrvError) -> Self {
        common::AppError::from_service_error(&err)
    }
}
