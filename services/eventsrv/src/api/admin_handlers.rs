//! Admin API handlers for eventsrv service management

use axum::{extract::rejection::JsonRejection, response::Json};
use common::{AppError, SuccessResponse};

use crate::api::dto::{LogLevelResponse, SetLogLevelRequest};

/// Read the active log filter
///
/// @route GET /api/v1/admin/log-level
/// @output Json<SuccessResponse<LogLevelResponse>> - Current filter directive
pub async fn get_log_level() -> Json<SuccessResponse<LogLevelResponse>> {
    Json(SuccessResponse::new(LogLevelResponse {
        level: common::logging::get_log_level(),
    }))
}

/// Change the log filter at runtime
///
/// @route PUT /api/v1/admin/log-level
/// @input Json<SetLogLevelRequest> - `{level}`, any EnvFilter directive
/// @output Json<SuccessResponse<LogLevelResponse>> - The filter now in effect
/// @side-effects Reloads the global tracing filter
pub async fn set_log_level(
    payload: Result<Json<SetLogLevelRequest>, JsonRejection>,
) -> Result<Json<SuccessResponse<LogLevelResponse>>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        AppError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let level = request.level.trim();
    if level.is_empty() {
        return Err(AppError::bad_request("level must not be empty"));
    }

    common::logging::set_log_level(level).map_err(AppError::bad_request)?;

    Ok(Json(SuccessResponse::new(LogLevelResponse {
        level: level.to_string(),
    })))
}
