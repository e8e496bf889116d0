//! Recipient resolution
//!
//! Resolves the users authorized for an alarm by asking the alarm registry.
//! Results are never cached; every event resolves afresh.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::collaborators::{AlarmRegistry, CollaboratorError};
use crate::dispatch::with_timeout;
use crate::error::{EventSrvError, Result};
use crate::event::{AlarmId, UserId};

const REGISTRY: &str = "alarm registry";

/// Ordered, duplicate-free set of users associated with one alarm
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecipientSet(Vec<UserId>);

impl RecipientSet {
    pub fn contains(&self, user: UserId) -> bool {
        self.0.contains(&user)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<UserId> for RecipientSet {
    /// Keeps the first occurrence of each user
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        let mut users: Vec<UserId> = Vec::new();
        for user in iter {
            if !users.contains(&user) {
                users.push(user);
            }
        }
        Self(users)
    }
}

/// Resolves alarm ids to recipient sets
///
/// One registry call per resolution, bounded by `timeout` and never retried.
#[derive(Clone)]
pub struct RecipientResolver {
    registry: Arc<dyn AlarmRegistry>,
    timeout: Duration,
}

impl RecipientResolver {
    pub fn new(registry: Arc<dyn AlarmRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Fails with `RecipientNotFound` for unknown alarms and
    /// `UpstreamUnavailable` for any other registry failure.
    pub async fn resolve(&self, alarm_id: &AlarmId) -> Result<RecipientSet> {
        let call = self.registry.recipients(alarm_id);
        match with_timeout(REGISTRY, self.timeout, call).await {
            Ok(users) => {
                let recipients: RecipientSet = users.into_iter().collect();
                debug!("Alarm {} resolves to {} recipients", alarm_id, recipients.len());
                Ok(recipients)
            },
            Err(CollaboratorError::NotFound { .. }) => {
                Err(EventSrvError::alarm_not_found(alarm_id.clone()))
            },
            Err(e) => {
                warn!("Recipient resolution for alarm {} failed: {}", alarm_id, e);
                Err(e.into())
            },
        }
    }
}
