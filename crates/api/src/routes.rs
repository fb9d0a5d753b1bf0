//! HTTP route handlers for the API.

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use triage_common::TriageError;
use triage_core::TriageResult;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub provider: String,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        provider: state.service.provider_name().to_string(),
    })
}

/// Triage request body.
#[derive(Debug, Deserialize)]
pub struct TriageRequest {
    pub text: String,
}

/// API error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.error,
                code: self.code,
            }),
        )
            .into_response()
    }
}

/// Triage a support ticket.
///
/// Provider failures surface as 502 with a generic message; the full error
/// is logged, not leaked to the caller.
pub async fn triage_ticket(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TriageRequest>,
) -> Result<Json<TriageResult>, ApiError> {
    if request.text.trim().is_empty() {
        return Err(ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "Ticket description required".into(),
            code: "EMPTY_TICKET",
        });
    }

    info!(
        preview = %request.text.chars().take(50).collect::<String>(),
        "received ticket"
    );

    match state.service.process(&request.text).await {
        Ok(result) => Ok(Json(result)),
        Err(TriageError::Provider(e)) => {
            error!(error = %e, "classification provider failed");
            Err(ApiError {
                status: StatusCode::BAD_GATEWAY,
                error: "Upstream classification service unavailable".into(),
                code: "PROVIDER_ERROR",
            })
        }
        Err(e) => {
            error!(error = %e, "triage failed");
            Err(ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: "Triage failed".into(),
                code: "TRIAGE_ERROR",
            })
        }
    }
}
