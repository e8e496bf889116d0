//! Application State Management
//!
//! Central application state that is shared across all API handlers

use std::sync::Arc;
use std::time::Instant;

use common::service_bootstrap::ServiceInfo;

use crate::config::EventsrvConfig;
use crate::orchestrator::EventOrchestrator;

/// Application state containing shared resources
pub struct AppState {
    /// Effective configuration after file, environment and CLI layering
    pub config: Arc<EventsrvConfig>,

    /// Stateless orchestrator shared by all requests
    pub orchestrator: Arc<EventOrchestrator>,

    pub service_info: ServiceInfo,

    /// Process start, used for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        config: Arc<EventsrvConfig>,
        orchestrator: Arc<EventOrchestrator>,
        service_info: ServiceInfo,
    ) -> Self {
        Self {
            config,
            orchestrator,
            service_info,
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
