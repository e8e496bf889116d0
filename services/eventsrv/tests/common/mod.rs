//! Common test utilities and helpers

#![allow(dead_code)]
#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use eventsrv::bootstrap::create_service_info;
use eventsrv::test_utils::{RecordingEventLog, RecordingNotifier, RecordingRegistry};
use eventsrv::{AppState, Collaborators, EventOrchestrator, EventsrvConfig};

/// Router wired to recording fakes
pub struct TestApp {
    pub router: Router,
    pub registry: Arc<RecordingRegistry>,
    pub event_log: Arc<RecordingEventLog>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Defaults with a short dispatch budget
pub fn test_config() -> EventsrvConfig {
    let mut config = EventsrvConfig::default();
    config.dispatch.timeout_ms = 100;
    config.dispatch.retry_jitter_ms = 5;
    config
}

pub fn create_test_app(
    registry: RecordingRegistry,
    event_log: RecordingEventLog,
    notifier: RecordingNotifier,
    config: EventsrvConfig,
) -> TestApp {
    let registry = Arc::new(registry);
    let event_log = Arc::new(event_log);
    let notifier = Arc::new(notifier);

    let orchestrator = EventOrchestrator::new(
        Collaborators {
            registry: registry.clone(),
            event_log: event_log.clone(),
            notifier: notifier.clone(),
        },
        config.dispatch_policy(),
    );
    let state = Arc::new(AppState::new(
        Arc::new(config),
        Arc::new(orchestrator),
        create_service_info(),
    ));

    TestApp {
        router: eventsrv::create_routes(state),
        registry,
        event_log,
        notifier,
    }
}

/// App whose registry knows alarm `A1` with recipients 7 and 9
pub fn default_test_app() -> TestApp {
    create_test_app(
        RecordingRegistry::with_recipients("A1", &[7, 9]),
        RecordingEventLog::new(),
        RecordingNotifier::new(),
        test_config(),
    )
}

/// Helper to make JSON requests
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    raw_request(app, method, uri, body).await
}

/// Send a request with a JSON content type and an arbitrary body
pub async fn raw_request(app: &Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let body: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, body)
}
