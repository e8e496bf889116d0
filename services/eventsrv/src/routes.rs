//! API Route Configuration
//!
//! Central route definition for all Event Service API endpoints

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::admin_handlers::{get_log_level, set_log_level};
use crate::api::event_handlers::{arm_alarm, disarm_alarm, trigger_alarm};
use crate::api::health_handlers::{health_check, status};
use crate::app_state::AppState;

/// Create all API routes for the Event Service
pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .route("/status", get(status))
        // Event orchestration API
        .route("/api/v1/events/trigger", post(trigger_alarm))
        .route("/api/v1/events/arm", post(arm_alarm))
        .route("/api/v1/events/disarm", post(disarm_alarm))
        // Paths the gateway of the existing mesh proxies to
        .route("/disparar", post(trigger_alarm))
        .route("/acionar", post(arm_alarm))
        .route("/desarmar", post(disarm_alarm))
        // Admin
        .route(
            "/api/v1/admin/log-level",
            get(get_log_level).put(set_log_level),
        )
        .layer(axum::middleware::from_fn(
            common::logging::http_request_logger,
        ))
        .with_state(state)
}
