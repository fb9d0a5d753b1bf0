//! HTTP boundary for the helpdesk triage service.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check (exempt from rate limiting)
//! - `POST /api/v1/triage` - Triage a support ticket
//!
//! # Status mapping
//!
//! - Admission denied → 429 with a `Retry-After` header
//! - Empty ticket text → 400
//! - Provider failure → 502

pub mod rate_limit;
pub mod routes;
pub mod state;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use rate_limit::{Decision, RateLimitConfig, RateLimiter};
pub use state::AppState;

/// Create the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/v1/triage", post(routes::triage_ticket))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the API server on the given address.
///
/// The server is built with ConnectInfo so the rate limiter can key on the
/// peer IP.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);

    info!(%addr, "Starting triage API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
