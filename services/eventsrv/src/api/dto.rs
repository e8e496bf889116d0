//! Data Transfer Objects for Event Service API
//!
//! Request bodies accept camelCase, snake_case and the field names used by
//! the existing mesh (`id_alarme`, `id_usuario`, `id_ponto`).

use serde::{Deserialize, Serialize};

use common::serde_helpers::{deserialize_optional_i64, deserialize_optional_id};

use crate::error::{EventSrvError, Result};
use crate::event::{AlarmEvent, AlarmId, EventKind, UserId};

/// Body of the trigger, arm and disarm endpoints
///
/// Every field is optional at the serde level so that missing fields
/// surface as validation errors with a field name instead of a raw
/// deserialization message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(
        default,
        alias = "alarm_id",
        alias = "id_alarme",
        deserialize_with = "deserialize_optional_id"
    )]
    pub alarm_id: Option<String>,

    #[serde(
        default,
        alias = "actor_user_id",
        alias = "id_usuario",
        alias = "userId",
        deserialize_with = "deserialize_optional_i64"
    )]
    pub actor_user_id: Option<i64>,

    #[serde(
        default,
        alias = "origin_point",
        alias = "id_ponto",
        deserialize_with = "deserialize_optional_id"
    )]
    pub origin_point: Option<String>,
}

impl EventRequest {
    /// Validate the body for `kind` and build the domain event
    pub fn into_event(self, kind: EventKind) -> Result<AlarmEvent> {
        let alarm_id = self
            .alarm_id
            .ok_or_else(|| EventSrvError::validation("alarmId is required"))?;
        let alarm_id = AlarmId::parse(alarm_id)?;

        AlarmEvent::new(
            kind,
            alarm_id,
            self.actor_user_id.map(UserId),
            self.origin_point,
        )
    }
}

/// Log level change request
#[derive(Debug, Deserialize)]
pub struct SetLogLevelRequest {
    pub level: String,
}

/// Current log filter
#[derive(Debug, Serialize)]
pub struct LogLevelResponse {
    pub level: String,
}
