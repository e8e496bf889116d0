//! HTTP collaborator adapter tests against mock servers

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eventsrv::collaborators::{HttpAlarmRegistry, HttpEventLog, HttpNotifier};
use eventsrv::{
    AlarmEvent, AlarmId, AlarmRegistry, CollaboratorError, Collaborators, DispatchPolicy,
    EventKind, EventLog, EventOrchestrator, EventSrvError, LogRecord, NotificationTask, Notifier,
    TaskOutcome, UserId,
};

fn a1() -> AlarmId {
    AlarmId::parse("A1").unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn test_registry_reads_recipient_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alarmes/A1/usuarios"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id_usuario": 7}, {"id_usuario": "9"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let registry = HttpAlarmRegistry::new(client(), &server.uri()).unwrap();
    let users = registry.recipients(&a1()).await.unwrap();

    assert_eq!(users, vec![UserId(7), UserId(9)]);
}

#[tokio::test]
async fn test_registry_empty_list_is_valid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alarmes/A1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let registry = HttpAlarmRegistry::new(client(), &server.uri()).unwrap();
    assert!(registry.recipients(&a1()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_registry_error_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/alarmes/A404/usuarios"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alarmes/A500/usuarios"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alarmes/BAD/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let registry = HttpAlarmRegistry::new(client(), &server.uri()).unwrap();

    let not_found = registry
        .recipients(&AlarmId::parse("A404").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(not_found, CollaboratorError::NotFound { .. }));

    let rejected = registry
        .recipients(&AlarmId::parse("A500").unwrap())
        .await
        .unwrap_err();
    assert_eq!(
        rejected,
        CollaboratorError::Rejected {
            service: "alarm registry",
            status: 500,
            body: "db down".into(),
        }
    );

    let invalid = registry
        .recipients(&AlarmId::parse("BAD").unwrap())
        .await
        .unwrap_err();
    assert!(matches!(invalid, CollaboratorError::InvalidPayload { .. }));
}

#[tokio::test]
async fn test_unreachable_collaborator_is_connect_failure() {
    // Nothing listens on the discard port
    let registry = HttpAlarmRegistry::new(client(), "http://127.0.0.1:9").unwrap();
    let err = registry.recipients(&a1()).await.unwrap_err();

    assert!(matches!(err, CollaboratorError::ConnectFailed { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_event_log_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logs"))
        .and(body_json(json!({
            "evento": "DISPARO",
            "id_alarme": 42,
            "id_usuario": null,
            "descricao": "Alarm triggered at point door-1."
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let event_log = HttpEventLog::new(client(), &server.uri()).unwrap();
    let event = AlarmEvent::trigger(AlarmId::parse("42").unwrap(), Some("door-1".into())).unwrap();
    event_log.append(&event.log_record()).await.unwrap();
}

#[tokio::test]
async fn test_event_log_records_actor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/logs"))
        .and(body_json(json!({
            "evento": "DESARME",
            "id_alarme": "A1",
            "id_usuario": 9,
            "descricao": "Alarm disarmed by user 9."
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let event_log = HttpEventLog::new(client(), &server.uri()).unwrap();
    let record = LogRecord {
        event_kind: EventKind::Disarm,
        alarm_id: a1(),
        actor_user_id: Some(UserId(9)),
        description: "Alarm disarmed by user 9.".into(),
    };
    event_log.append(&record).await.unwrap();
}

#[tokio::test]
async fn test_notifier_wire_format_and_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/notificar"))
        .and(body_json(json!({"id_usuario": 7, "mensagem": "hello"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notificar"))
        .and(body_json(json!({"id_usuario": 8, "mensagem": "hello"})))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/notificar"))
        .and(body_json(json!({"id_usuario": 404, "mensagem": "hello"})))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let notifier = HttpNotifier::new(client(), &server.uri()).unwrap();
    let task = |user: i64| NotificationTask {
        recipient_id: UserId(user),
        message: "hello".into(),
    };

    notifier.notify(&task(7)).await.unwrap();

    let unavailable = notifier.notify(&task(8)).await.unwrap_err();
    assert!(matches!(unavailable, CollaboratorError::Rejected { status: 503, .. }));
    assert!(unavailable.is_retryable());

    let unknown_user = notifier.notify(&task(404)).await.unwrap_err();
    assert!(matches!(unknown_user, CollaboratorError::NotFound { .. }));
    assert!(!unknown_user.is_retryable());
}

#[tokio::test]
async fn test_base_url_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mesh/notificar"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = HttpNotifier::new(client(), &format!("{}/mesh/", server.uri())).unwrap();
    notifier
        .notify(&NotificationTask {
            recipient_id: UserId(7),
            message: "hello".into(),
        })
        .await
        .unwrap();
}

fn http_orchestrator(
    registry: &MockServer,
    logging: &MockServer,
    notification: &MockServer,
) -> EventOrchestrator {
    let client = client();
    EventOrchestrator::new(
        Collaborators {
            registry: Arc::new(HttpAlarmRegistry::new(client.clone(), &registry.uri()).unwrap()),
            event_log: Arc::new(HttpEventLog::new(client.clone(), &logging.uri()).unwrap()),
            notifier: Arc::new(HttpNotifier::new(client, &notification.uri()).unwrap()),
        },
        DispatchPolicy {
            timeout: Duration::from_millis(200),
            max_retries: 1,
            retry_jitter: Duration::from_millis(5),
        },
    )
}

#[tokio::test]
async fn test_orchestrated_trigger_over_http() {
    let registry = MockServer::start().await;
    let logging = MockServer::start().await;
    let notification = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alarmes/A1/usuarios"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id_usuario": 7}, {"id_usuario": 9}])),
        )
        .mount(&registry)
        .await;
    Mock::given(method("POST"))
        .and(path("/logs"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&logging)
        .await;
    Mock::given(method("POST"))
        .and(path("/notificar"))
        .and(body_json(json!({
            "id_usuario": 7,
            "mensagem": "ALERT! Alarm A1 was TRIGGERED at point door-1."
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&notification)
        .await;
    // User 9's send stalls past the per-call timeout
    Mock::given(method("POST"))
        .and(path("/notificar"))
        .and(body_json(json!({
            "id_usuario": 9,
            "mensagem": "ALERT! Alarm A1 was TRIGGERED at point door-1."
        })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(1)
        .mount(&notification)
        .await;

    let orchestrator = http_orchestrator(&registry, &logging, &notification);
    let event = AlarmEvent::trigger(a1(), Some("door-1".into())).unwrap();
    let result = orchestrator.orchestrate(event).await.unwrap();

    assert_eq!(result.log_outcome, TaskOutcome::Ok);
    assert_eq!(result.notification_outcomes[&UserId(7)], TaskOutcome::Ok);
    assert!(!result.notification_outcomes[&UserId(9)].is_ok());
    assert_eq!(result.failed_deliveries(), 1);
}

#[tokio::test]
async fn test_unauthorized_arm_over_http_touches_only_registry() {
    let registry = MockServer::start().await;
    let logging = MockServer::start().await;
    let notification = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/alarmes/A1/usuarios"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id_usuario": 7}, {"id_usuario": 9}])),
        )
        .expect(1)
        .mount(&registry)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&logging)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&notification)
        .await;

    let orchestrator = http_orchestrator(&registry, &logging, &notification);
    let event = AlarmEvent::arm(a1(), UserId(3)).unwrap();
    let err = orchestrator.orchestrate(event).await.unwrap_err();

    assert_eq!(err, EventSrvError::not_authorized(UserId(3), a1()));
}
