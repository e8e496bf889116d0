//! Alarm mesh basic library
//!
//! Provides functions shared by all services, including:
//! - standard API response and error envelopes
//! - logging setup and the HTTP access-log middleware
//! - startup helpers (service metadata, `.env` loading, port resolution)
//! - graceful shutdown signal handling

pub mod api_types;
pub mod bootstrap_args;
pub mod logging;
pub mod serde_helpers;
pub mod service_bootstrap;
pub mod shutdown;

// Re-export commonly used API types
pub use api_types::{
    ComponentHealth, ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse,
};

// Re-export AppError when axum feature is enabled
#[cfg(feature = "axum")]
pub use api_types::AppError;

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

// Re-export CLI dependencies when cli feature is enabled
#[cfg(feature = "cli")]
pub use clap;

#[cfg(feature = "cli")]
pub use clap::Parser;
