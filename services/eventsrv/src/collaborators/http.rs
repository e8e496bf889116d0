//! HTTP adapters for the collaborator ports
//!
//! Wire formats follow the existing mesh services:
//! - registry: `GET /alarmes/{id}/usuarios` → `[{"id_usuario": 7}, ...]`
//! - logging: `POST /logs` with `{evento, id_alarme, id_usuario, descricao}`
//! - notification: `POST /notificar` with `{id_usuario, mensagem}`
//!
//! All adapters share one pooled `reqwest::Client`.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AlarmRegistry, CollaboratorError, EventLog, Notifier};
use crate::error::{EventSrvError, Result};
use crate::event::{AlarmId, LogRecord, NotificationTask, UserId};

const REGISTRY: &str = "alarm registry";
const LOGGING: &str = "logging";
const NOTIFICATION: &str = "notification";

/// Longest error body kept in a `Rejected` error
const MAX_ERROR_BODY: usize = 200;

pub(crate) fn parse_base_url(service: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| EventSrvError::config(format!("{} url '{}': {}", service, raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(EventSrvError::config(format!(
            "{} url '{}' must be an http(s) base url",
            service, raw
        )));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base url
///
/// `.` and `..` are refused since they would be resolved, not encoded.
fn join_segments(base: &Url, segments: &[&str]) -> Option<Url> {
    if segments.iter().any(|s| matches!(*s, "." | "..")) {
        return None;
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

fn classify(service: &'static str, err: reqwest::Error) -> CollaboratorError {
    if err.is_connect() {
        CollaboratorError::ConnectFailed {
            service,
            reason: err.to_string(),
        }
    } else {
        CollaboratorError::Transport {
            service,
            reason: err.to_string(),
        }
    }
}

async fn reject(service: &'static str, response: Response) -> CollaboratorError {
    let status = response.status().as_u16();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    CollaboratorError::Rejected {
        service,
        status,
        body,
    }
}

/// Numeric alarm ids travel as JSON numbers, others as strings
fn alarm_id_value(alarm_id: &AlarmId) -> serde_json::Value {
    alarm_id
        .as_str()
        .parse::<i64>()
        .map(serde_json::Value::from)
        .unwrap_or_else(|_| serde_json::Value::from(alarm_id.as_str()))
}

// ============================================================================
// Alarm registry
// ============================================================================

#[derive(Debug, Deserialize)]
struct RecipientRow {
    #[serde(
        alias = "user_id",
        alias = "userId",
        deserialize_with = "common::serde_helpers::deserialize_i64_flexible"
    )]
    id_usuario: i64,
}

/// Alarm registry client
#[derive(Debug, Clone)]
pub struct HttpAlarmRegistry {
    client: HttpClient,
    base_url: Url,
}

impl HttpAlarmRegistry {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(REGISTRY, base_url)?,
        })
    }
}

#[async_trait]
impl AlarmRegistry for HttpAlarmRegistry {
    async fn recipients(
        &self,
        alarm_id: &AlarmId,
    ) -> std::result::Result<Vec<UserId>, CollaboratorError> {
        let url = join_segments(&self.base_url, &["alarmes", alarm_id.as_str(), "usuarios"])
            .ok_or_else(|| CollaboratorError::Transport {
                service: REGISTRY,
                reason: format!("cannot build url from {}", self.base_url),
            })?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(REGISTRY, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CollaboratorError::NotFound {
                service: REGISTRY,
                what: format!("alarm {}", alarm_id),
            }),
            status if status.is_success() => {
                let rows: Vec<RecipientRow> = response.json().await.map_err(|e| {
                    CollaboratorError::InvalidPayload {
                        service: REGISTRY,
                        reason: e.to_string(),
                    }
                })?;
                Ok(rows.into_iter().map(|row| UserId(row.id_usuario)).collect())
            },
            _ => Err(reject(REGISTRY, response).await),
        }
    }
}

// ============================================================================
// Event log
// ============================================================================

#[derive(Debug, Serialize)]
struct LogEntryBody<'a> {
    evento: &'static str,
    id_alarme: serde_json::Value,
    id_usuario: Option<i64>,
    descricao: &'a str,
}

/// Logging service client
#[derive(Debug, Clone)]
pub struct HttpEventLog {
    client: HttpClient,
    endpoint: Url,
}

impl HttpEventLog {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        let base = parse_base_url(LOGGING, base_url)?;
        let endpoint = join_segments(&base, &["logs"])
            .ok_or_else(|| EventSrvError::config(format!("invalid logging url {}", base)))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl EventLog for HttpEventLog {
    async fn append(&self, record: &LogRecord) -> std::result::Result<(), CollaboratorError> {
        let body = LogEntryBody {
            evento: record.event_kind.wire_name(),
            id_alarme: alarm_id_value(&record.alarm_id),
            id_usuario: record.actor_user_id.map(|user| user.0),
            descricao: &record.description,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(LOGGING, e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(reject(LOGGING, response).await)
        }
    }
}

// ============================================================================
// Notification
// ============================================================================

#[derive(Debug, Serialize)]
struct NotifyBody<'a> {
    id_usuario: i64,
    mensagem: &'a str,
}

/// Notification service client
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: HttpClient,
    endpoint: Url,
}

impl HttpNotifier {
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self> {
        let base = parse_base_url(NOTIFICATION, base_url)?;
        let endpoint = join_segments(&base, &["notificar"])
            .ok_or_else(|| EventSrvError::config(format!("invalid notification url {}", base)))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(
        &self,
        task: &NotificationTask,
    ) -> std::result::Result<(), CollaboratorError> {
        let body = NotifyBody {
            id_usuario: task.recipient_id.0,
            mensagem: &task.message,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| classify(NOTIFICATION, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CollaboratorError::NotFound {
                service: NOTIFICATION,
                what: format!("user {}", task.recipient_id),
            }),
            status if status.is_success() => Ok(()),
            _ => Err(reject(NOTIFICATION, response).await),
        }
    }
}
