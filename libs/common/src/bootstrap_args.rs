//! Common command-line arguments for alarm mesh services

#[cfg(feature = "cli")]
use clap::Parser;
use std::path::PathBuf;

/// Common service startup arguments
///
/// Options shared by every service binary: configuration file, logging,
/// bind address override and validation-only runs.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", clap(author, version, about))]
pub struct ServiceArgs {
    /// Configuration file (.yaml, .yml, .toml or .json)
    #[cfg_attr(feature = "cli", clap(short = 'c', long, env = "CONFIG_FILE"))]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[cfg_attr(feature = "cli", clap(short = 'l', long))]
    pub log_level: Option<String>,

    /// Optional bind address override (e.g., 0.0.0.0:3003)
    #[cfg_attr(feature = "cli", clap(short = 'b', long, env = "BIND_ADDRESS"))]
    pub bind_address: Option<String>,

    /// Disable colored output (useful when piping logs)
    #[cfg_attr(feature = "cli", clap(long))]
    pub no_color: bool,

    /// Only validate configuration without starting service
    #[cfg_attr(feature = "cli", clap(long))]
    pub validate: bool,
}

impl ServiceArgs {
    /// Parse log level string to tracing::Level
    ///
    /// Filter directives such as `info,eventsrv=debug` fall back to INFO.
    pub fn parse_log_level(&self) -> tracing::Level {
        match self
            .log_level
            .as_deref()
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("trace") => tracing::Level::TRACE,
            Some("debug") => tracing::Level::DEBUG,
            Some("warn") | Some("warning") => tracing::Level::WARN,
            Some("error") => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }

    /// Split an `host:port` bind address override
    pub fn bind_override(&self) -> Option<(String, u16)> {
        let addr = self.bind_address.as_deref()?;
        let (host, port) = addr.rsplit_once(':')?;
        let port = port.parse().ok()?;
        Some((host.trim_matches(['[', ']']).to_string(), port))
    }
}
