//! Sliding-window admission control for API endpoints.
//!
//! Each client key owns an ordered window of admitted-request timestamps.
//! The check-and-record step for one key is atomic behind that key's own
//! mutex; the shared map is only read-locked long enough to fetch the
//! window handle, so different keys never serialize against each other.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::{Mutex, RwLock};
use std::net::SocketAddr;
use tracing::warn;

use crate::state::AppState;

/// Configuration for the admission controller.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per key within the window.
    pub max_requests: u32,
    /// Trailing window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny { retry_after_secs: u64 },
}

type Window = Arc<Mutex<VecDeque<Instant>>>;

/// Per-key sliding-window rate limiter.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: RwLock<HashMap<String, Window>>,
    last_sweep: RwLock<Instant>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: RwLock::new(HashMap::new()),
            last_sweep: RwLock::new(Instant::now()),
        }
    }

    /// Check-and-record for one key.
    ///
    /// Prunes timestamps older than the window, denies with a wait hint when
    /// the remaining count is at the limit, records `now` and allows
    /// otherwise. Atomic per key.
    pub fn admit(&self, key: &str) -> Decision {
        self.maybe_sweep();

        let window = self.window_for(key);
        let mut slots = window.lock();
        let now = Instant::now();

        Self::prune(&mut slots, now, self.config.window);

        if slots.len() >= self.config.max_requests as usize {
            // Wait until the oldest counted request leaves the window.
            let retry_after_secs = slots
                .front()
                .map(|oldest| {
                    let remaining = self
                        .config
                        .window
                        .saturating_sub(now.duration_since(*oldest));
                    remaining.as_secs_f64().ceil() as u64
                })
                .unwrap_or_else(|| self.config.window.as_secs());

            warn!(key, retry_after_secs, "rate limit exceeded");
            return Decision::Deny { retry_after_secs };
        }

        slots.push_back(now);
        Decision::Allow
    }

    /// Number of keys currently tracked, for monitoring and tests.
    pub fn tracked_keys(&self) -> usize {
        self.windows.read().len()
    }

    fn window_for(&self, key: &str) -> Window {
        if let Some(window) = self.windows.read().get(key) {
            return window.clone();
        }
        // Created lazily on first request from a key.
        self.windows
            .write()
            .entry(key.to_string())
            .or_default()
            .clone()
    }

    fn prune(slots: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while slots
            .front()
            .is_some_and(|t| now.duration_since(*t) >= window)
        {
            slots.pop_front();
        }
    }

    /// Drop keys whose windows are empty after pruning. Bounds the growth
    /// of per-key state over the process lifetime.
    pub fn sweep_stale(&self) {
        let now = Instant::now();
        self.windows.write().retain(|_, window| {
            let mut slots = window.lock();
            Self::prune(&mut slots, now, self.config.window);
            !slots.is_empty()
        });
    }

    /// Periodically sweep stale keys (every 5 minutes).
    fn maybe_sweep(&self) {
        const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

        let due = {
            let last = self.last_sweep.read();
            last.elapsed() > SWEEP_INTERVAL
        };

        if due {
            let mut last = self.last_sweep.write();
            // Double-check after acquiring the write lock
            if last.elapsed() > SWEEP_INTERVAL {
                self.sweep_stale();
                *last = Instant::now();
            }
        }
    }
}

/// Body returned with a 429.
#[derive(Debug, serde::Serialize)]
struct RateLimitBody {
    error: &'static str,
    retry_after: u64,
}

/// Admission middleware keyed on the client IP.
///
/// The `/health` endpoint is exempt. Denials map to 429 with a `Retry-After`
/// header carrying the wait hint.
pub async fn limit_requests(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    match state.limiter.admit(&addr.ip().to_string()) {
        Decision::Allow => next.run(request).await,
        Decision::Deny { retry_after_secs } => (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", retry_after_secs.to_string())],
            Json(RateLimitBody {
                error: "Rate limit exceeded. Try again later.",
                retry_after: retry_after_secs,
            }),
        )
            .into_response(),
    }
}
