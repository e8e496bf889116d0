//! Unified service bootstrap utilities
//!
//! Common startup functionality for alarm mesh services: service metadata,
//! startup banner, logging initialization and environment setup.

use crate::logging::{self, LogConfig};
use std::path::PathBuf;
use tracing::{info, Level};

/// Service metadata for startup
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    /// Service name (e.g., "eventsrv")
    pub name: String,
    /// Service version
    pub version: String,
    /// Service description
    pub description: String,
    /// Default port
    pub default_port: u16,
}

impl ServiceInfo {
    /// Create new service info
    ///
    /// The version defaults to this library's version; services pass their
    /// own through [`ServiceInfo::with_version`].
    pub fn new(name: impl Into<String>, description: impl Into<String>, default_port: u16) -> Self {
        Self {
            name: name.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: description.into(),
            default_port,
        }
    }

    /// Override the reported version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Print unified startup banner for any service
pub fn print_startup_banner(service: &ServiceInfo) {
    let banner = r#"
    _    _                      __  __           _
   / \  | | __ _ _ __ _ __ ___ |  \/  | ___  ___| |__
  / _ \ | |/ _` | '__| '_ ` _ \| |\/| |/ _ \/ __| '_ \
 / ___ \| | (_| | |  | | | | | | |  | |  __/\__ \ | | |
/_/   \_\_|\__,_|_|  |_| |_| |_|_|  |_|\___||___/_| |_|
    "#;

    info!("{}", banner);
    info!("");
    info!(" {} v{}", service.name.to_uppercase(), service.version);
    info!(" {}", service.description);
    info!(" Default Port: {}", service.default_port);
    info!("");
}

/// Logging options a service passes from its own configuration
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Base filter directive (e.g. "info")
    pub level: Option<String>,
    /// Directory for rolling log files
    pub dir: Option<PathBuf>,
    /// JSON file output
    pub json: bool,
    /// Disable ANSI colors on the console
    pub no_color: bool,
}

/// Initialize logging for a service with standard configuration
///
/// Log directory priority:
/// 1. ALARM_MESH_LOG_DIR environment variable
/// 2. `options.dir`
/// 3. console only
pub fn init_logging(service: &ServiceInfo, options: &LoggingOptions) -> anyhow::Result<()> {
    let log_dir = std::env::var("ALARM_MESH_LOG_DIR")
        .ok()
        .map(PathBuf::from)
        .or_else(|| options.dir.clone())
        .map(|dir| dir.join(&service.name));

    let log_config = LogConfig {
        service_name: service.name.clone(),
        log_dir,
        level: options.level.clone().unwrap_or_else(|| "info".to_string()),
        enable_json: options.json,
        ansi: !options.no_color,
        enable_api_log: true,
        api_log_level: Level::INFO,
    };

    logging::init_with_config(log_config)
}

/// Load environment variables in development mode
///
/// In debug builds, reads `.env` and sets variables that are not already set.
/// In release builds this is a no-op.
pub fn load_development_env() {
    #[cfg(debug_assertions)]
    {
        if let Ok(content) = std::fs::read_to_string(".env") {
            for (key, value) in parse_env_lines(&content) {
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }
}

/// Parse `KEY=VALUE` lines, skipping comments and blanks; surrounding quotes
/// on values are stripped.
#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn parse_env_lines(content: &str) -> Vec<(&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            (key.trim(), value)
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
