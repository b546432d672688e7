//! HTTP routes for the credential issuer.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::CredentialIssuer;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Issuer built from validated LiveKit credentials, `None` when any of
    /// them is missing.
    pub issuer: Option<Arc<CredentialIssuer>>,
}

impl AppState {
    /// Validate the LiveKit settings once and build the issuer.
    ///
    /// Missing settings are logged, not fatal: the service still serves
    /// health probes and answers connection requests with a 500.
    pub fn from_config(config: &Config) -> Self {
        let issuer = match config.livekit_credentials() {
            Ok(credentials) => Some(Arc::new(CredentialIssuer::new(credentials))),
            Err(e) => {
                tracing::warn!(
                    target: "issuer.routes",
                    error = %e,
                    "LiveKit credentials unavailable; connection requests will fail"
                );
                None
            }
        };

        Self { issuer }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/api/connection-details` - Issue connection details (POST)
/// - `/health` - Liveness probe
/// - `/ready` - Readiness probe (LiveKit credentials present)
/// - `/metrics` - Prometheus metrics endpoint
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let app_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/api/connection-details", post(handlers::create_connection))
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. http_metrics_middleware (outermost, sees 404/405 too)
    app_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::observability::metrics::detached_metrics_handle;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn config(with_livekit: bool) -> Config {
        let mut vars = HashMap::new();
        if with_livekit {
            vars.insert("LIVEKIT_URL".to_string(), "wss://shams.livekit.cloud".to_string());
            vars.insert("LIVEKIT_API_KEY".to_string(), "APIdevkey".to_string());
            vars.insert(
                "LIVEKIT_API_SECRET".to_string(),
                "dev-secret-dev-secret-dev-secret".to_string(),
            );
        }
        Config::from_vars(&vars).unwrap()
    }

    fn app(with_livekit: bool) -> Router {
        let state = Arc::new(AppState::from_config(&config(with_livekit)));
        build_routes(state, detached_metrics_handle().unwrap())
    }

    async fn post_connection(app: Router) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/connection-details")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_from_config_without_livekit_has_no_issuer() {
        assert!(AppState::from_config(&config(false)).issuer.is_none());
        assert!(AppState::from_config(&config(true)).issuer.is_some());
    }

    #[tokio::test]
    async fn test_connection_details_route() {
        let (status, body) = post_connection(app(true)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["serverUrl"], "wss://shams.livekit.cloud");
        assert!(body["participantToken"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_connection_details_route_unconfigured() {
        let (status, body) = post_connection(app(false)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({"error": "LiveKit credentials not configured"})
        );
    }

    #[tokio::test]
    async fn test_connection_details_rejects_get() {
        let response = app(true)
            .oneshot(
                Request::builder()
                    .uri("/api/connection-details")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
