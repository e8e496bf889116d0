//! EventSrv library
//!
//! Orchestrates alarm events across the alarm mesh: resolves recipients,
//! authorizes user actions, then logs the event and notifies recipients
//! concurrently while capturing each task's outcome.

pub mod api;
pub mod app_state;
pub mod authorization;
pub mod bootstrap;
pub mod collaborators;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod resolver;
pub mod routes;
pub mod test_utils;

// Re-export commonly used types
pub use app_state::AppState;
pub use collaborators::{AlarmRegistry, CollaboratorError, EventLog, Notifier};
pub use config::EventsrvConfig;
pub use dispatch::DispatchPolicy;
pub use error::{EventSrvError, Result};
pub use event::{AlarmEvent, AlarmId, EventKind, LogRecord, NotificationTask, UserId};
pub use orchestrator::{Collaborators, EventOrchestrator, OrchestrationResult, TaskOutcome};
pub use resolver::{RecipientResolver, RecipientSet};
pub use routes::create_routes;
