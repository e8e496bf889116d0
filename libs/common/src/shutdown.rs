//! Graceful shutdown utilities

use tracing::warn;

/// Wait for a shutdown signal and return its name
///
/// On Unix this resolves on Ctrl+C (SIGINT) or SIGTERM; elsewhere on Ctrl+C
/// only.
///
/// # Example
///
/// ```ignore
/// axum::serve(listener, app)
///     .with_graceful_shutdown(async {
///         let signal = common::shutdown::wait_for_shutdown().await;
///         info!("Received {}, shutting down", signal);
///     })
///     .await?;
/// ```
pub async fn wait_for_shutdown() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let term_signal = match signal(SignalKind::terminate()) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!(
                    "Failed to install SIGTERM handler: {}. Service will only respond to Ctrl+C",
                    e
                );
                None
            },
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => "SIGINT",
            _ = async {
                match term_signal {
                    Some(mut sig) => {
                        sig.recv().await;
                    },
                    None => std::future::pending::<()>().await,
                }
            } => "SIGTERM",
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
        "Ctrl+C"
    }
}
