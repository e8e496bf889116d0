//! Alarm event API handlers
//!
//! Trigger, arm and disarm all funnel into the orchestrator. Validation
//! happens here, before any collaborator is contacted.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use common::{AppError, SuccessResponse};
use tracing::warn;

use crate::api::dto::EventRequest;
use crate::app_state::AppState;
use crate::event::EventKind;
use crate::orchestrator::OrchestrationResult;

type EventResponse = Result<Json<SuccessResponse<OrchestrationResult>>, AppError>;

async fn handle_event(
    state: &AppState,
    kind: EventKind,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> EventResponse {
    let Json(request) = payload.map_err(|rejection| {
        AppError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let event = request.into_event(kind)?;
    let result = state.orchestrator.orchestrate(event).await?;

    let failed = result.failed_deliveries();
    if failed > 0 && state.config.dispatch.partial_failure_is_error {
        warn!("Answering 500 for event {}: {} tasks failed", result.event_id, failed);
        let details = serde_json::to_value(&result)
            .map_err(|e| AppError::internal_error(format!("Failed to encode result: {}", e)))?;
        return Err(AppError::internal_error(format!(
            "{} of {} dispatch tasks failed",
            failed,
            result.notification_outcomes.len() + 1
        ))
        .with_details(details));
    }

    let event_id = result.event_id.to_string();
    Ok(Json(
        SuccessResponse::new(result)
            .with_metadata("event_id", serde_json::Value::from(event_id))
            .with_metadata("failed_deliveries", serde_json::Value::from(failed))
            .with_metadata(
                "timestamp",
                serde_json::Value::from(chrono::Utc::now().to_rfc3339()),
            ),
    ))
}

/// Trigger an alarm
///
/// Logs the trigger and notifies every recipient of the alarm.
///
/// @route POST /api/v1/events/trigger (alias POST /disparar)
/// @input Json<EventRequest> - `{alarmId, originPoint?}`
/// @output Json<SuccessResponse<OrchestrationResult>> - Per-task outcomes
/// @side-effects One log write, one notification per recipient
pub async fn trigger_alarm(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> EventResponse {
    handle_event(&state, EventKind::Trigger, payload).await
}

/// Arm an alarm
///
/// @route POST /api/v1/events/arm (alias POST /acionar)
/// @input Json<EventRequest> - `{alarmId, actorUserId}`
/// @output Json<SuccessResponse<OrchestrationResult>> - Per-task outcomes
/// @side-effects One log write and a confirmation to the actor, only when authorized
pub async fn arm_alarm(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> EventResponse {
    handle_event(&state, EventKind::Arm, payload).await
}

/// Disarm an alarm
///
/// @route POST /api/v1/events/disarm (alias POST /desarmar)
/// @input Json<EventRequest> - `{alarmId, actorUserId}`
/// @output Json<SuccessResponse<OrchestrationResult>> - Per-task outcomes
/// @side-effects One log write and a confirmation to the actor, only when authorized
pub async fn disarm_alarm(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> EventResponse {
    handle_event(&state, EventKind::Disarm, payload).await
}
