//! Application state for the API server.

use std::time::Duration;

use triage_core::{TriageConfig, TriageService};

use crate::rate_limit::{RateLimitConfig, RateLimiter};

/// Shared application state for the API server.
pub struct AppState {
    /// The triage pipeline (gateway + knowledge index)
    pub service: TriageService,

    /// Per-client admission controller
    pub limiter: RateLimiter,

    /// Server start time (for health checks)
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state from configuration. Fails if the knowledge
    /// corpus cannot be loaded.
    pub fn new(config: &TriageConfig) -> triage_common::Result<Self> {
        let service = TriageService::from_config(config)?;
        let limiter = RateLimiter::new(RateLimitConfig {
            max_requests: config.limits.max_requests,
            window: Duration::from_secs(config.limits.window_secs),
        });
        Ok(Self::from_parts(service, limiter))
    }

    /// Assemble state from already-built components.
    pub fn from_parts(service: TriageService, limiter: RateLimiter) -> Self {
        Self {
            service,
            limiter,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
