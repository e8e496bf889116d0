//! Alarm event domain types
//!
//! An [`AlarmEvent`] can only be built through constructors that enforce the
//! actor rule: arm and disarm always name the acting user, triggers never do.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EventSrvError, Result};

/// Placeholder used in texts when a trigger carries no origin point
const UNKNOWN_POINT: &str = "unknown";

/// Alarm identifier (non-empty, trimmed, never a `.` or `..` path segment)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AlarmId(String);

impl AlarmId {
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EventSrvError::validation("alarmId must not be empty"));
        }
        // Dot segments are resolved by url joining instead of encoded
        if matches!(trimmed, "." | "..") {
            return Err(EventSrvError::validation(format!(
                "alarmId '{}' is not a valid identifier",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// User identifier as stored by the alarm registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of alarm event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Arm,
    Disarm,
    Trigger,
}

impl EventKind {
    /// Arm and disarm are user actions and carry an actor
    pub fn requires_actor(&self) -> bool {
        matches!(self, EventKind::Arm | EventKind::Disarm)
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            EventKind::Arm => "armed",
            EventKind::Disarm => "disarmed",
            EventKind::Trigger => "triggered",
        }
    }

    /// Event name stored by the logging collaborator
    pub fn wire_name(&self) -> &'static str {
        match self {
            EventKind::Arm => "ACIONAMENTO",
            EventKind::Disarm => "DESARME",
            EventKind::Trigger => "DISPARO",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Arm => "arm",
            EventKind::Disarm => "disarm",
            EventKind::Trigger => "trigger",
        };
        f.write_str(name)
    }
}

/// One occurrence of an alarm event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEvent {
    kind: EventKind,
    alarm_id: AlarmId,
    actor: Option<UserId>,
    origin_point: Option<String>,
}

impl AlarmEvent {
    /// Generic constructor
    ///
    /// Fails unless `actor` is present exactly for arm/disarm, and
    /// `origin_point` only accompanies triggers.
    pub fn new(
        kind: EventKind,
        alarm_id: AlarmId,
        actor: Option<UserId>,
        origin_point: Option<String>,
    ) -> Result<Self> {
        let origin_point = origin_point
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        match (kind.requires_actor(), actor) {
            (true, None) => {
                return Err(EventSrvError::validation(format!(
                    "actorUserId is required for {} events",
                    kind
                )))
            },
            (false, Some(_)) => {
                return Err(EventSrvError::validation(
                    "trigger events must not carry an actorUserId",
                ))
            },
            _ => {},
        }
        if kind != EventKind::Trigger && origin_point.is_some() {
            return Err(EventSrvError::validation(
                "originPoint is only accepted on trigger events",
            ));
        }

        Ok(Self {
            kind,
            alarm_id,
            actor,
            origin_point,
        })
    }

    pub fn trigger(alarm_id: AlarmId, origin_point: Option<String>) -> Result<Self> {
        Self::new(EventKind::Trigger, alarm_id, None, origin_point)
    }

    pub fn arm(alarm_id: AlarmId, actor: UserId) -> Result<Self> {
        Self::new(EventKind::Arm, alarm_id, Some(actor), None)
    }

    pub fn disarm(alarm_id: AlarmId, actor: UserId) -> Result<Self> {
        Self::new(EventKind::Disarm, alarm_id, Some(actor), None)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn alarm_id(&self) -> &AlarmId {
        &self.alarm_id
    }

    pub fn actor(&self) -> Option<UserId> {
        self.actor
    }

    pub fn origin_point(&self) -> Option<&str> {
        self.origin_point.as_deref()
    }

    fn origin_or_unknown(&self) -> &str {
        self.origin_point().unwrap_or(UNKNOWN_POINT)
    }

    /// Log entry written once per dispatched event
    pub fn log_record(&self) -> LogRecord {
        let description = match self.actor {
            Some(actor) => format!("Alarm {} by user {}.", self.kind.past_tense(), actor),
            None => format!("Alarm triggered at point {}.", self.origin_or_unknown()),
        };
        LogRecord {
            event_kind: self.kind,
            alarm_id: self.alarm_id.clone(),
            actor_user_id: self.actor,
            description,
        }
    }

    /// Notification text for one recipient
    ///
    /// Triggers broadcast an alert; arm/disarm confirm the actor's own action.
    pub fn notification_message(&self) -> String {
        match self.kind {
            EventKind::Trigger => format!(
                "ALERT! Alarm {} was TRIGGERED at point {}.",
                self.alarm_id,
                self.origin_or_unknown()
            ),
            EventKind::Arm | EventKind::Disarm => format!(
                "Alarm {} was {} by you.",
                self.alarm_id,
                self.kind.past_tense()
            ),
        }
    }
}

/// Event log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub event_kind: EventKind,
    pub alarm_id: AlarmId,
    pub actor_user_id: Option<UserId>,
    pub description: String,
}

/// One notification to deliver
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTask {
    pub recipient_id: UserId,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn a1() -> AlarmId {
        AlarmId::parse("A1").unwrap()
    }

    #[test]
    fn test_alarm_id_rejects_blank() {
        assert!(AlarmId::parse("   ").is_err());
        assert_eq!(AlarmId::parse(" A1 ").unwrap().as_str(), "A1");
    }

    #[test]
    fn test_alarm_id_rejects_dot_segments() {
        for raw in [".", "..", " .. "] {
            let err = AlarmId::parse(raw).unwrap_err();
            assert!(matches!(err, EventSrvError::ValidationError(_)), "{:?}", raw);
        }
        assert_eq!(AlarmId::parse("...").unwrap().as_str(), "...");
        assert_eq!(AlarmId::parse("a.b").unwrap().as_str(), "a.b");
    }

    #[test]
    fn test_trigger_never_has_actor() {
        let err = AlarmEvent::new(EventKind::Trigger, a1(), Some(UserId(7)), None).unwrap_err();
        assert!(matches!(err, EventSrvError::ValidationError(_)));

        let event = AlarmEvent::trigger(a1(), Some("door-1".into())).unwrap();
        assert_eq!(event.actor(), None);
        assert_eq!(event.origin_point(), Some("door-1"));
    }

    #[test]
    fn test_arm_and_disarm_require_actor() {
        assert!(AlarmEvent::new(EventKind::Arm, a1(), None, None).is_err());
        assert!(AlarmEvent::new(EventKind::Disarm, a1(), None, None).is_err());
        assert!(
            AlarmEvent::new(EventKind::Arm, a1(), Some(UserId(9)), Some("door".into())).is_err()
        );
        assert_eq!(AlarmEvent::arm(a1(), UserId(9)).unwrap().actor(), Some(UserId(9)));
    }

    #[test]
    fn test_blank_origin_point_is_absent() {
        let event = AlarmEvent::trigger(a1(), Some("  ".into())).unwrap();
        assert_eq!(event.origin_point(), None);
        assert_eq!(
            event.log_record().description,
            "Alarm triggered at point unknown."
        );
    }

    #[test]
    fn test_trigger_texts() {
        let event = AlarmEvent::trigger(a1(), Some("door-1".into())).unwrap();
        let record = event.log_record();
        assert_eq!(record.event_kind, EventKind::Trigger);
        assert_eq!(record.actor_user_id, None);
        assert_eq!(record.description, "Alarm triggered at point door-1.");
        assert_eq!(
            event.notification_message(),
            "ALERT! Alarm A1 was TRIGGERED at point door-1."
        );
    }

    #[test]
    fn test_actor_texts() {
        let event = AlarmEvent::disarm(a1(), UserId(9)).unwrap();
        assert_eq!(event.log_record().description, "Alarm disarmed by user 9.");
        assert_eq!(event.notification_message(), "Alarm A1 was disarmed by you.");
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(EventKind::Trigger.wire_name(), "DISPARO");
        assert_eq!(EventKind::Arm.wire_name(), "ACIONAMENTO");
        assert_eq!(EventKind::Disarm.wire_name(), "DESARME");
    }
}
