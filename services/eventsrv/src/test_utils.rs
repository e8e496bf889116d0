//! In-memory collaborator fakes for tests
//!
//! Each fake records what it was asked to do so tests can assert on call
//! counts, and can be scripted to fail or stall per call.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::collaborators::{AlarmRegistry, CollaboratorError, EventLog, Notifier};
use crate::event::{AlarmId, LogRecord, NotificationTask, UserId};

/// Alarm registry backed by a map; unknown alarms answer `NotFound`
#[derive(Debug, Default)]
pub struct RecordingRegistry {
    alarms: HashMap<String, Vec<UserId>>,
    failure: Option<CollaboratorError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl RecordingRegistry {
    pub fn with_recipients(alarm_id: &str, users: &[i64]) -> Self {
        Self::default().and_alarm(alarm_id, users)
    }

    pub fn and_alarm(mut self, alarm_id: &str, users: &[i64]) -> Self {
        self.alarms
            .insert(alarm_id.to_string(), users.iter().copied().map(UserId).collect());
        self
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AlarmRegistry for RecordingRegistry {
    async fn recipients(&self, alarm_id: &AlarmId) -> Result<Vec<UserId>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.alarms
            .get(alarm_id.as_str())
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound {
                service: "alarm registry",
                what: format!("alarm {}", alarm_id),
            })
    }
}

/// Event log that keeps appended records in memory
#[derive(Debug, Default)]
pub struct RecordingEventLog {
    records: Mutex<Vec<LogRecord>>,
    failure: Option<CollaboratorError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl RecordingEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Successfully written records
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Attempts, successful or not
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventLog for RecordingEventLog {
    async fn append(&self, record: &LogRecord) -> Result<(), CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Notifier with per-recipient scripted failures and delays
///
/// Tracks the peak number of sends in flight at once.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<NotificationTask>>,
    failures: HashMap<UserId, CollaboratorError>,
    delays: HashMap<UserId, Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, user: i64, error: CollaboratorError) -> Self {
        self.failures.insert(UserId(user), error);
        self
    }

    pub fn slow_for(mut self, user: i64, delay: Duration) -> Self {
        self.delays.insert(UserId(user), delay);
        self
    }

    /// Successfully delivered tasks
    pub fn delivered(&self) -> Vec<NotificationTask> {
        self.delivered.lock().clone()
    }

    /// Attempts, successful or not
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, task: &NotificationTask) -> Result<(), CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        // Yield so concurrently dispatched sends overlap
        tokio::task::yield_now().await;
        if let Some(delay) = self.delays.get(&task.recipient_id) {
            tokio::time::sleep(*delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(error) = self.failures.get(&task.recipient_id) {
            return Err(error.clone());
        }
        self.delivered.lock().push(task.clone());
        Ok(())
    }
}
