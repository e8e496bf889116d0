//! Event orchestration service configuration
//!
//! Layering, lowest to highest precedence:
//! 1. built-in defaults
//! 2. optional config file (`.yaml`, `.yml`, `.toml`, `.json`)
//! 3. legacy deployment variables (`SERVICE_PORT`, `ALARM_SERVICE_URL`, ...)
//! 4. `EVENTSRV_` prefixed variables, `__` separating nested keys
//!    (e.g. `EVENTSRV_DISPATCH__TIMEOUT_MS=1500`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    value::{Uncased, UncasedStr},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::collaborators::http::parse_base_url;
use crate::dispatch::DispatchPolicy;
use crate::error::{EventSrvError, Result};

pub const DEFAULT_PORT: u16 = 3003;

/// Variables used by the existing container deployment
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SERVICE_PORT", "api.port"),
    ("ALARM_SERVICE_URL", "collaborators.alarm_registry_url"),
    ("LOGGING_SERVICE_URL", "collaborators.logging_url"),
    ("NOTIFICATION_SERVICE_URL", "collaborators.notification_url"),
];

fn legacy_key(key: &UncasedStr) -> Option<Uncased<'_>> {
    LEGACY_ENV
        .iter()
        .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
        .map(|(_, path)| Uncased::from_borrowed(path))
}

/// Complete service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EventsrvConfig {
    pub service: ServiceConfig,
    pub api: ApiConfig,
    pub collaborators: CollaboratorsConfig,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub description: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "eventsrv".to_string(),
            description: Some("Alarm event orchestration service".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Base urls of the remote collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorsConfig {
    pub alarm_registry_url: String,
    pub logging_url: String,
    pub notification_url: String,
    /// Idle keep-alive connections kept per collaborator host
    pub pool_max_idle_per_host: usize,
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            alarm_registry_url: "http://localhost:3002".to_string(),
            logging_url: "http://localhost:3006".to_string(),
            notification_url: "http://localhost:3005".to_string(),
            pool_max_idle_per_host: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per-attempt bound for every collaborator call
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_jitter_ms: u64,
    /// Answer 500 when any log or notification task failed
    pub partial_failure_is_error: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        let policy = DispatchPolicy::default();
        Self {
            timeout_ms: policy.timeout.as_millis() as u64,
            max_retries: policy.max_retries,
            retry_jitter_ms: policy.retry_jitter.as_millis() as u64,
            partial_failure_is_error: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
    pub json: bool,
    /// Also write daily rolling files under `dir`
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
            json: false,
            file: false,
        }
    }
}

impl EventsrvConfig {
    /// Load configuration, optionally layering a config file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EventsrvConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(EventSrvError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let extension = path
                .extension()
                .and_then(|s| s.to_str())
                .ok_or_else(|| EventSrvError::config("Config file must have an extension"))?;

            figment = match extension {
                "yaml" | "yml" => figment.merge(Yaml::file(path)),
                "toml" => figment.merge(Toml::file(path)),
                "json" => figment.merge(Json::file(path)),
                _ => {
                    return Err(EventSrvError::config(format!(
                        "Unsupported config format: {}",
                        extension
                    )))
                },
            };
        }

        let config: EventsrvConfig = figment
            .merge(Env::raw().filter_map(legacy_key))
            .merge(Env::prefixed("EVENTSRV_").split("__"))
            .extract()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.service.name.trim().is_empty() {
            return Err(EventSrvError::config("Service name cannot be empty"));
        }
        if self.api.port == 0 {
            return Err(EventSrvError::config("API port cannot be 0"));
        }
        if self.dispatch.timeout_ms == 0 {
            return Err(EventSrvError::config("Dispatch timeout must be positive"));
        }

        parse_base_url("alarm registry", &self.collaborators.alarm_registry_url)?;
        parse_base_url("logging", &self.collaborators.logging_url)?;
        parse_base_url("notification", &self.collaborators.notification_url)?;

        Ok(())
    }

    pub fn dispatch_policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            timeout: Duration::from_millis(self.dispatch.timeout_ms),
            max_retries: self.dispatch.max_retries,
            retry_jitter: Duration::from_millis(self.dispatch.retry_jitter_ms),
        }
    }

    pub fn bind_address(&self) -> String {
        if self.api.host.contains(':') {
            format!("[{}]:{}", self.api.host, self.api.port)
        } else {
            format!("{}:{}", self.api.host, self.api.port)
        }
    }
}
