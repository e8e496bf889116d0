//! Event orchestration
//!
//! Drives one alarm event through
//! `Received → Resolving → (Authorizing) → Dispatching → Aggregating → Completed`,
//! with `Rejected` reachable from resolution and authorization.
//!
//! Dispatch launches the log write and every notification together and
//! waits for all of them; a failed task is recorded in the result and never
//! cancels or suppresses the others.

use std::collections::BTreeMap;
use std::sync::Arc;

use errors::ServiceErrorTrait;
use futures::future::{join, join_all};
use serde::Serialize;
use tracing::{debug, error, info, warn, Instrument, Level};
use uuid::Uuid;

use crate::authorization::authorize;
use crate::collaborators::{AlarmRegistry, CollaboratorError, EventLog, Notifier};
use crate::dispatch::DispatchPolicy;
use crate::error::{EventSrvError, Result};
use crate::event::{AlarmEvent, AlarmId, EventKind, LogRecord, NotificationTask, UserId};
use crate::resolver::RecipientResolver;

const LOGGING: &str = "logging";
const NOTIFICATION: &str = "notification";

/// Orchestration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Resolving,
    Authorizing,
    Dispatching,
    Aggregating,
    Completed,
    Rejected,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Resolving => "resolving",
            Stage::Authorizing => "authorizing",
            Stage::Dispatching => "dispatching",
            Stage::Aggregating => "aggregating",
            Stage::Completed => "completed",
            Stage::Rejected => "rejected",
        }
    }
}

fn enter(stage: Stage) {
    debug!(stage = stage.as_str(), "Stage transition");
}

fn reject(err: &EventSrvError) {
    let stage = Stage::Rejected.as_str();
    let level = err.log_level();
    if level == Level::ERROR {
        error!(stage, code = err.error_code(), "Event rejected: {}", err);
    } else if level == Level::WARN {
        warn!(stage, code = err.error_code(), "Event rejected: {}", err);
    } else {
        info!(stage, code = err.error_code(), "Event rejected: {}", err);
    }
}

/// Outcome of one dispatched task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Ok,
    Failed { reason: String },
}

impl TaskOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, TaskOutcome::Ok)
    }
}

impl From<std::result::Result<(), CollaboratorError>> for TaskOutcome {
    fn from(result: std::result::Result<(), CollaboratorError>) -> Self {
        match result {
            Ok(()) => TaskOutcome::Ok,
            Err(e) => TaskOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

/// Aggregate outcome of one orchestrated event
///
/// Created per request and returned to the caller; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationResult {
    /// Correlation id for logs; not an idempotency key
    pub event_id: Uuid,
    pub kind: EventKind,
    pub alarm_id: AlarmId,
    pub authorized: bool,
    pub log_outcome: TaskOutcome,
    pub notification_outcomes: BTreeMap<UserId, TaskOutcome>,
}

impl OrchestrationResult {
    /// Number of failed tasks, log write included
    pub fn failed_deliveries(&self) -> usize {
        let log_failed = usize::from(!self.log_outcome.is_ok());
        log_failed
            + self
                .notification_outcomes
                .values()
                .filter(|outcome| !outcome.is_ok())
                .count()
    }

    pub fn is_fully_delivered(&self) -> bool {
        self.failed_deliveries() == 0
    }
}

/// Collaborator implementations injected into the orchestrator
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn AlarmRegistry>,
    pub event_log: Arc<dyn EventLog>,
    pub notifier: Arc<dyn Notifier>,
}

/// Stateless coordinator for alarm events
///
/// Holds no per-request state, so one instance serves concurrent requests.
pub struct EventOrchestrator {
    resolver: RecipientResolver,
    event_log: Arc<dyn EventLog>,
    notifier: Arc<dyn Notifier>,
    policy: DispatchPolicy,
}

impl EventOrchestrator {
    /// The resolver shares the policy timeout but is never retried
    pub fn new(collaborators: Collaborators, policy: DispatchPolicy) -> Self {
        Self {
            resolver: RecipientResolver::new(collaborators.registry, policy.timeout),
            event_log: collaborators.event_log,
            notifier: collaborators.notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Orchestrate one event
    ///
    /// Errors mean nothing was logged or notified. Once dispatch starts the
    /// call always succeeds and per-task failures live in the result.
    pub async fn orchestrate(&self, event: AlarmEvent) -> Result<OrchestrationResult> {
        let event_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "orchestrate",
            %event_id,
            kind = %event.kind(),
            alarm_id = %event.alarm_id()
        );
        self.drive(event_id, event).instrument(span).await
    }

    async fn drive(&self, event_id: Uuid, event: AlarmEvent) -> Result<OrchestrationResult> {
        enter(Stage::Received);

        enter(Stage::Resolving);
        let recipients = self
            .resolver
            .resolve(event.alarm_id())
            .await
            .inspect_err(reject)?;

        // Triggers fan out to every recipient; arm/disarm confirm to the actor only
        let audience: Vec<UserId> = match event.actor() {
            Some(actor) => {
                enter(Stage::Authorizing);
                if !authorize(actor, &recipients) {
                    let err = EventSrvError::not_authorized(actor, event.alarm_id().clone());
                    reject(&err);
                    return Err(err);
                }
                vec![actor]
            },
            None => recipients.iter().collect(),
        };

        enter(Stage::Dispatching);
        let record = event.log_record();
        let message = event.notification_message();
        let tasks: Vec<NotificationTask> = audience
            .into_iter()
            .map(|recipient_id| NotificationTask {
                recipient_id,
                message: message.clone(),
            })
            .collect();
        let (log_outcome, notification_outcomes) = self.dispatch(&record, &tasks).await;

        enter(Stage::Aggregating);
        let result = OrchestrationResult {
            event_id,
            kind: event.kind(),
            alarm_id: event.alarm_id().clone(),
            authorized: true,
            log_outcome,
            notification_outcomes,
        };

        let failed = result.failed_deliveries();
        if failed == 0 {
            info!(
                stage = Stage::Completed.as_str(),
                "Event dispatched: log written, {} notifications delivered",
                tasks.len()
            );
        } else {
            warn!(
                stage = Stage::Completed.as_str(),
                "Event dispatched with {} failed of {} tasks",
                failed,
                tasks.len() + 1
            );
        }
        Ok(result)
    }

    /// Join barrier over one log write and all notification sends
    async fn dispatch(
        &self,
        record: &LogRecord,
        tasks: &[NotificationTask],
    ) -> (TaskOutcome, BTreeMap<UserId, TaskOutcome>) {
        let log_write = self
            .policy
            .run(LOGGING, || self.event_log.append(record));

        let sends = tasks.iter().map(|task| async move {
            let result = self
                .policy
                .run(NOTIFICATION, || self.notifier.notify(task))
                .await;
            (task.recipient_id, result)
        });

        let (log_result, send_results) = join(log_write, join_all(sends)).await;

        if let Err(e) = &log_result {
            error!("Log write failed: {}", e);
        }
        let notification_outcomes = send_results
            .into_iter()
            .map(|(recipient, result)| {
                if let Err(e) = &result {
                    warn!("Notification to user {} failed: {}", recipient, e);
                }
                (recipient, TaskOutcome::from(result))
            })
            .collect();

        (TaskOutcome::from(log_result), notification_outcomes)
    }
}
