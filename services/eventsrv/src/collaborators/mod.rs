//! Remote collaborator ports
//!
//! The orchestrator talks to the alarm registry, the event log and the
//! notification service only through these traits, so tests can swap in
//! in-memory fakes (see [`crate::test_utils`]).

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::event::{AlarmId, LogRecord, NotificationTask, UserId};

pub use http::{HttpAlarmRegistry, HttpEventLog, HttpNotifier};

/// Failure of a single remote call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollaboratorError {
    /// The request never reached the collaborator
    #[error("{service} unreachable: {reason}")]
    ConnectFailed {
        service: &'static str,
        reason: String,
    },

    /// The request failed after it was sent
    #[error("{service} transport error: {reason}")]
    Transport {
        service: &'static str,
        reason: String,
    },

    #[error("{service} did not respond within {timeout_ms}ms")]
    TimedOut {
        service: &'static str,
        timeout_ms: u64,
    },

    /// Non-success HTTP status
    #[error("{service} answered {status}: {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} does not know {what}")]
    NotFound { service: &'static str, what: String },

    #[error("{service} returned an invalid payload: {reason}")]
    InvalidPayload {
        service: &'static str,
        reason: String,
    },
}

impl CollaboratorError {
    /// Only failures where the collaborator cannot have acted on the request
    pub fn is_retryable(&self) -> bool {
        match self {
            CollaboratorError::ConnectFailed { .. } => true,
            CollaboratorError::Rejected { status, .. } => *status == 503,
            _ => false,
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            CollaboratorError::ConnectFailed { service, .. }
            | CollaboratorError::Transport { service, .. }
            | CollaboratorError::TimedOut { service, .. }
            | CollaboratorError::Rejected { service, .. }
            | CollaboratorError::NotFound { service, .. }
            | CollaboratorError::InvalidPayload { service, .. } => service,
        }
    }
}

/// Source of the users associated with an alarm
#[async_trait]
pub trait AlarmRegistry: Send + Sync {
    /// Users authorized for the alarm, in registry order
    ///
    /// Unknown alarms yield [`CollaboratorError::NotFound`].
    async fn recipients(&self, alarm_id: &AlarmId) -> Result<Vec<UserId>, CollaboratorError>;
}

/// Durable event log
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append(&self, record: &LogRecord) -> Result<(), CollaboratorError>;
}

/// Per-recipient notification delivery
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, task: &NotificationTask) -> Result<(), CollaboratorError>;
}
