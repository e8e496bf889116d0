//! EventSrv main program
//!
//! Starts the alarm event orchestration HTTP service.

use common::bootstrap_args::ServiceArgs;
use common::shutdown::wait_for_shutdown;
use common::Parser;
use tracing::{error, info};

use eventsrv::bootstrap::{
    build_app_state, create_service_info, init_environment, load_configuration,
};
use eventsrv::create_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServiceArgs::parse();
    let service_info = create_service_info();

    common::service_bootstrap::load_development_env();

    let config = load_configuration(&args)?;
    if args.validate {
        println!("Configuration is valid");
        println!("  listen:       {}", config.bind_address());
        println!("  registry:     {}", config.collaborators.alarm_registry_url);
        println!("  logging:      {}", config.collaborators.logging_url);
        println!("  notification: {}", config.collaborators.notification_url);
        return Ok(());
    }

    init_environment(&service_info, &config, &args)?;

    let addr = config.bind_address();
    let state = build_app_state(config, service_info)?;
    let app = create_routes(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
    })?;

    info!("API server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = wait_for_shutdown().await;
            info!("Received {}, shutting down", signal);
        })
        .await?;

    info!("EventSrv stopped");
    Ok(())
}
