//! Service Bootstrap and Initialization
//!
//! Handles all service initialization including logging, configuration,
//! the shared HTTP client and component setup.

use std::sync::Arc;
use std::time::Duration;

use common::bootstrap_args::ServiceArgs;
use common::service_bootstrap::{LoggingOptions, ServiceInfo};
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::collaborators::{HttpAlarmRegistry, HttpEventLog, HttpNotifier};
use crate::config::{EventsrvConfig, DEFAULT_PORT};
use crate::error::{EventSrvError, Result};
use crate::orchestrator::{Collaborators, EventOrchestrator};

/// Initialize service info for unified bootstrap
pub fn create_service_info() -> ServiceInfo {
    ServiceInfo::new(
        "eventsrv",
        "Event Service - Alarm Event Orchestration",
        DEFAULT_PORT,
    )
    .with_version(env!("CARGO_PKG_VERSION"))
}

/// Load configuration and apply command-line overrides
///
/// Priority: CLI > `EVENTSRV_*` > legacy variables > config file > defaults.
/// Environment layering is left entirely to [`EventsrvConfig::load`].
pub fn load_configuration(args: &ServiceArgs) -> Result<EventsrvConfig> {
    let mut config = EventsrvConfig::load(args.config.as_deref())?;

    if let Some(bind) = &args.bind_address {
        let (host, port) = args
            .bind_override()
            .ok_or_else(|| EventSrvError::config(format!("Invalid bind address: {}", bind)))?;
        config.api.host = host;
        config.api.port = port;
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    config.validate()?;
    debug!("Config valid");

    Ok(config)
}

/// Initialize logging and print the startup banner
pub fn init_environment(
    service_info: &ServiceInfo,
    config: &EventsrvConfig,
    args: &ServiceArgs,
) -> Result<()> {
    let options = LoggingOptions {
        level: Some(config.logging.level.clone()),
        dir: config.logging.file.then(|| config.logging.dir.clone()),
        json: config.logging.json,
        no_color: args.no_color,
    };

    common::service_bootstrap::init_logging(service_info, &options)
        .map_err(|e| EventSrvError::config(format!("Failed to initialize logging: {}", e)))?;

    common::service_bootstrap::print_startup_banner(service_info);

    info!("EventSrv starting");
    Ok(())
}

/// Build the pooled client shared by all collaborator adapters
pub fn build_http_client(config: &EventsrvConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(config.collaborators.pool_max_idle_per_host)
        .connect_timeout(Duration::from_millis(config.dispatch.timeout_ms))
        .user_agent(concat!("eventsrv/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| EventSrvError::config(format!("Failed to build HTTP client: {}", e)))
}

/// Wire the HTTP collaborator adapters
pub fn build_collaborators(client: reqwest::Client, config: &EventsrvConfig) -> Result<Collaborators> {
    let urls = &config.collaborators;
    Ok(Collaborators {
        registry: Arc::new(HttpAlarmRegistry::new(client.clone(), &urls.alarm_registry_url)?),
        event_log: Arc::new(HttpEventLog::new(client.clone(), &urls.logging_url)?),
        notifier: Arc::new(HttpNotifier::new(client, &urls.notification_url)?),
    })
}

/// Create the shared application state
pub fn build_app_state(config: EventsrvConfig, service_info: ServiceInfo) -> Result<Arc<AppState>> {
    let client = build_http_client(&config)?;
    let collaborators = build_collaborators(client, &config)?;
    let policy = config.dispatch_policy();

    info!(
        "Collaborators: registry={} logging={} notification={}",
        config.collaborators.alarm_registry_url,
        config.collaborators.logging_url,
        config.collaborators.notification_url
    );
    info!(
        "Dispatch: timeout={}ms retries={} jitter={}ms",
        config.dispatch.timeout_ms, config.dispatch.max_retries, config.dispatch.retry_jitter_ms
    );

    let orchestrator = Arc::new(EventOrchestrator::new(collaborators, policy));
    Ok(Arc::new(AppState::new(
        Arc::new(config),
        orchestrator,
        service_info,
    )))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_service_info() {
        let info = create_service_info();
        assert_eq!(info.name, "eventsrv");
        assert_eq!(info.default_port, 3003);
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_build_app_state_from_defaults() {
        let state = build_app_state(EventsrvConfig::default(), create_service_info()).unwrap();
        assert_eq!(state.orchestrator.policy(), &EventsrvConfig::default().dispatch_policy());
        assert_eq!(state.config.api.port, 3003);
    }

    #[test]
    fn test_invalid_collaborator_url_fails_wiring() {
        let mut config = EventsrvConfig::default();
        config.collaborators.notification_url = "not a url".to_string();
        let client = build_http_client(&config).unwrap();
        assert!(matches!(
            build_collaborators(client, &config),
            Err(EventSrvError::ConfigError(_))
        ));
    }
}
