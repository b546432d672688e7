//! Health check handlers.
//!
//! - `/health`: Liveness probe, returns OK while the process is running
//! - `/ready`: Readiness probe, fails while LiveKit credentials are missing

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

/// Liveness probe handler.
///
/// Does not check configuration; failure means the process is hung.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Returns 200 when connection details can be issued, 503 otherwise. The
/// response never names which variables are missing; that goes to the log.
#[tracing::instrument(skip_all, name = "issuer.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.issuer.is_none() {
        tracing::warn!(
            target: "issuer.health",
            "Readiness check failed: LiveKit credentials not configured"
        );
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                livekit: "not_configured",
                error: Some("Service dependencies unavailable".to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            livekit: "configured",
            error: None,
        }),
    )
}
