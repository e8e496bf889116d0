//! Health Check API Handlers

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::{ComponentHealth, HealthStatus, ServiceStatus, SuccessResponse};
use serde_json::{Map, Value};

use crate::app_state::AppState;

/// Health check endpoint
///
/// Reports service identity, uptime and the configured collaborator
/// endpoints. Collaborators are not probed; reachability is only known
/// per event.
///
/// @route GET /health
/// @output Json<SuccessResponse<HealthStatus>> - Service health report
/// @side-effects None (read-only operation)
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Json<SuccessResponse<HealthStatus>> {
    let urls = &state.config.collaborators;
    let checks: HashMap<String, ComponentHealth> = [
        ("alarm_registry", &urls.alarm_registry_url),
        ("logging", &urls.logging_url),
        ("notification", &urls.notification_url),
    ]
    .into_iter()
    .map(|(name, url)| {
        (
            name.to_string(),
            ComponentHealth {
                status: ServiceStatus::Unknown,
                message: Some(format!("configured at {}", url)),
                duration_ms: None,
            },
        )
    })
    .collect();

    let mut dispatch = Map::new();
    dispatch.insert(
        "timeout_ms".to_string(),
        Value::from(state.config.dispatch.timeout_ms),
    );
    dispatch.insert(
        "max_retries".to_string(),
        Value::from(state.config.dispatch.max_retries),
    );

    Json(
        SuccessResponse::new(HealthStatus {
            status: ServiceStatus::Healthy,
            service: state.service_info.name.clone(),
            version: state.service_info.version.clone(),
            uptime_seconds: state.uptime_seconds(),
            timestamp: chrono::Utc::now(),
            checks,
        })
        .with_metadata("dispatch", Value::Object(dispatch)),
    )
}

/// Liveness probe in the format of the existing mesh services
///
/// @route GET /status
/// @output Json<Value> - `{service, status: "running"}`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut body = Map::new();
    body.insert(
        "service".to_string(),
        Value::from(state.service_info.name.clone()),
    );
    body.insert("status".to_string(), Value::from("running"));
    Json(Value::Object(body))
}
