//! Unified logging module for alarm mesh services
//!
//! Console output plus optional daily-rolling files, a separate `api_access`
//! stream for HTTP access logs, and a reloadable filter so the level can be
//! changed while the service runs.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, FormattedFields,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target used by the HTTP access-log middleware
pub const API_ACCESS_TARGET: &str = "api_access";

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] span{fields}: message`
///
/// Example output:
/// `2026-03-02T00:50:44.809123Z [INFO] orchestrate{event_id=..}: Dispatch complete`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        // Span context carries correlation ids such as event_id
        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let ext = span.extensions();
                if let Some(fields) = ext.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Keeps the non-blocking writers alive for the process lifetime
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

// Dynamic log level reload support
type EnvFilterReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
static LOG_FILTER_HANDLE: OnceLock<EnvFilterReloadHandle> = OnceLock::new();
static CURRENT_LOG_LEVEL: OnceLock<Mutex<String>> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name (e.g., "eventsrv")
    pub service_name: String,
    /// Directory for log files; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// Base filter directive used when RUST_LOG is not set (e.g. "info")
    pub level: String,
    /// Write file logs as JSON lines
    pub enable_json: bool,
    /// Emit ANSI colors on the console
    pub ansi: bool,
    /// Enable API access log separation
    pub enable_api_log: bool,
    /// API access log level
    pub api_log_level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: None,
            level: "info".to_string(),
            enable_json: false,
            ansi: true,
            enable_api_log: true,
            api_log_level: Level::INFO,
        }
    }
}

/// Compose the initial filter directive
///
/// RUST_LOG wins when set; `api_access` is appended unless RUST_LOG already
/// names it.
fn build_filter_directive(config: &LogConfig, rust_log: Option<&str>) -> String {
    let api_level = if config.enable_api_log {
        config.api_log_level.as_str().to_lowercase()
    } else {
        "off".to_string()
    };

    match rust_log {
        Some(env_str) if env_str.contains(API_ACCESS_TARGET) => env_str.to_string(),
        Some(env_str) => format!("{},{}={}", env_str, API_ACCESS_TARGET, api_level),
        None => format!(
            "{},{}=debug,{}={}",
            config.level, config.service_name, API_ACCESS_TARGET, api_level
        ),
    }
}

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut guards) => guards.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

/// Initialize logging system with configuration
///
/// Fails if a global subscriber is already installed.
pub fn init_with_config(config: LogConfig) -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = build_filter_directive(&config, rust_log.as_deref());
    let env_filter = EnvFilter::try_new(&directive)?;

    // Wrap EnvFilter with reload::Layer for dynamic level changes
    let (reload_filter, reload_handle) = reload::Layer::new(env_filter);
    let _ = LOG_FILTER_HANDLE.set(reload_handle);
    let _ = CURRENT_LOG_LEVEL.set(Mutex::new(directive.clone()));

    let registry = tracing_subscriber::registry().with(reload_filter);

    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    // Business file layer excludes api_access, API file layer takes only api_access
    let (business_file_layer, api_file_layer) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;

            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.service_name));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            keep_guard(guard);

            let business = if config.enable_json {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(filter::filter_fn(|metadata| {
                        metadata.target() != API_ACCESS_TARGET
                    }))
                    .boxed()
            } else {
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .with_filter(filter::filter_fn(|metadata| {
                        metadata.target() != API_ACCESS_TARGET
                    }))
                    .boxed()
            };

            let api = if config.enable_api_log {
                let appender = tracing_appender::rolling::daily(
                    dir,
                    format!("{}_api.log", config.service_name),
                );
                let (writer, guard) = tracing_appender::non_blocking(appender);
                keep_guard(guard);
                Some(
                    fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .event_format(BracketedLevelFormat)
                        .with_filter(filter::filter_fn(|metadata| {
                            metadata.target() == API_ACCESS_TARGET
                        }))
                        .boxed(),
                )
            } else {
                None
            };

            (Some(business), api)
        },
        None => (None, None),
    };

    registry
        .with(console_layer)
        .with(business_file_layer)
        .with(api_file_layer)
        .try_init()?;

    match &config.log_dir {
        Some(dir) => tracing::info!("Logging: {} @ {:?}", config.service_name, dir),
        None => tracing::info!("Logging: {} @ console", config.service_name),
    }
    tracing::debug!("Log filter: {}", directive);

    Ok(())
}

/// Change the active log filter at runtime
///
/// Accepts any `EnvFilter` directive, e.g. `debug` or `info,eventsrv=trace`.
///
/// # Example
/// ```ignore
/// common::logging::set_log_level("info,eventsrv=debug")?;
/// ```
pub fn set_log_level(level: &str) -> Result<(), String> {
    let handle = LOG_FILTER_HANDLE
        .get()
        .ok_or("Logging not initialized with reload support")?;

    let new_filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    handle
        .reload(new_filter)
        .map_err(|e| format!("Failed to reload log filter: {}", e))?;

    if let Some(current) = CURRENT_LOG_LEVEL.get() {
        if let Ok(mut guard) = current.lock() {
            *guard = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

/// Get current log filter directive
pub fn get_log_level() -> String {
    CURRENT_LOG_LEVEL
        .get()
        .and_then(|m| m.lock().ok())
        .map(|guard| guard.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

// ==================== HTTP access logging ====================

const SENSITIVE_KEYS: &[&str] = &["password", "token", "api_key", "secret", "authorization"];

/// Replace values of sensitive keys in a JSON body with a marker
///
/// Non-JSON input is returned unchanged.
fn redact_sensitive_fields(json_str: &str) -> String {
    use serde_json::Value;

    fn redact(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|k| key_lower.contains(k)) {
                        *val = Value::String("***REDACTED***".to_string());
                    } else {
                        redact(val);
                    }
                }
            },
            Value::Array(items) => items.iter_mut().for_each(redact),
            _ => {},
        }
    }

    let Ok(mut value) = serde_json::from_str::<Value>(json_str) else {
        return json_str.to_string();
    };
    redact(&mut value);
    serde_json::to_string(&value).unwrap_or_else(|_| json_str.to_string())
}

/// Truncate body string to at most `max_length` bytes on a char boundary
fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }
    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

/// Largest request body the access logger buffers (axum's default body limit)
pub const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// HTTP API request logger middleware
///
/// - **INFO**: POST/PUT/PATCH/DELETE requests (method, path, status, latency)
/// - **DEBUG**: all requests, with JSON request bodies redacted and truncated
///   to 500 bytes. Bodies are buffered up to [`MAX_BUFFERED_BODY`]; larger
///   ones are answered with 413 before reaching the handler.
///
/// Logs go to the `api_access` target, which the file setup routes to a
/// dedicated `{service}_api.log`.
///
/// Add this middleware to the router **before** `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     // ... routes ...
///     .layer(axum::middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_mutation = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    let is_json = req
        .headers()
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    let start = Instant::now();

    let (req, body_str) = if level_enabled!(Level::DEBUG) && is_mutation && is_json {
        let (parts, body) = req.into_parts();
        match axum::body::to_bytes(body, MAX_BUFFERED_BODY).await {
            Ok(bytes) => {
                let body_str = match std::str::from_utf8(&bytes) {
                    Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
                    Err(_) => "<binary data>".to_string(),
                };
                (
                    axum::extract::Request::from_parts(parts, Body::from(bytes)),
                    Some(body_str),
                )
            },
            Err(e) => {
                tracing::warn!(
                    target: "api_access",
                    method = %method,
                    path = %path,
                    "Failed to read request body: {}",
                    e
                );
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body unreadable or larger than {} bytes", MAX_BUFFERED_BODY),
                )
                    .into_response();
            },
        }
    } else {
        (req, None)
    };

    let response = next.run(req).await;
    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if is_mutation {
        info!(
            target: "api_access",
            method = %method,
            path = %path,
            status = status,
            duration_ms = duration_ms,
            "HTTP request"
        );
    }

    match body_str {
        Some(body) => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status = status,
            duration_ms = duration_ms,
            request_body = %body,
            "HTTP request (detailed)"
        ),
        None if !is_mutation => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status = status,
            duration_ms = duration_ms,
            "HTTP request"
        ),
        None => {},
    }

    response
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_defaults() {
        let config = LogConfig {
            service_name: "eventsrv".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_filter_directive(&config, None),
            "info,eventsrv=debug,api_access=info"
        );
    }

    #[test]
    fn test_filter_directive_respects_rust_log() {
        let config = LogConfig {
            enable_api_log: false,
            ..Default::default()
        };
        assert_eq!(
            build_filter_directive(&config, Some("warn")),
            "warn,api_access=off"
        );
        assert_eq!(
            build_filter_directive(&config, Some("debug,api_access=trace")),
            "debug,api_access=trace"
        );
    }

    #[cfg(feature = "axum")]
    async fn post_json(size: usize) -> axum::http::StatusCode {
        use axum::{body::Body, extract::DefaultBodyLimit, http::Request, routing::post, Router};
        use tower::ServiceExt;

        // Handler accepts any size so only the logger can refuse
        let app = Router::new()
            .route("/events", post(|body: String| async move { body.len().to_string() }))
            .layer(DefaultBodyLimit::disable())
            .layer(axum::middleware::from_fn(http_request_logger));
        let request = Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .body(Body::from(vec![b' '; size]))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[cfg(feature = "axum")]
    #[tokio::test]
    async fn test_debug_logger_caps_buffered_body() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        assert_eq!(post_json(16).await, axum::http::StatusCode::OK);
        assert_eq!(
            post_json(MAX_BUFFERED_BODY + 1).await,
            axum::http::StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_redact_sensitive_fields_nested() {
        let redacted =
            redact_sensitive_fields(r#"{"user":"a","auth":{"api_key":"k"},"list":[{"password":"p"}]}"#);
        let value: serde_json::Value = serde_json::from_str(&redacted).unwrap();
        assert_eq!(value["user"], "a");
        assert_eq!(value["auth"]["api_key"], "***REDACTED***");
        assert_eq!(value["list"][0]["password"], "***REDACTED***");
    }

    #[test]
    fn test_redact_non_json_passthrough() {
        assert_eq!(redact_sensitive_fields("not json"), "not json");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 10), "short");
        assert_eq!(truncate_body("abcdef", 3), "abc[truncated 3 bytes]");
        // 'é' is two bytes; cutting at 1 must back off to a char boundary
        assert_eq!(truncate_body("éa", 1), "[truncated 3 bytes]");
    }

    #[test]
    fn test_get_log_level_before_init() {
        // No subscriber is installed in unit tests
        if LOG_FILTER_HANDLE.get().is_none() {
            assert!(set_log_level("debug").is_err());
        }
    }
}
