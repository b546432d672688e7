//! Test server harness for E2E testing
//!
//! Provides `TestIssuerServer` for spawning real issuer instances in tests.

use crate::fixtures::test_livekit_vars;
use issuer_service::config::Config;
use issuer_service::observability::metrics::detached_metrics_handle;
use issuer_service::routes::{self, AppState};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Test harness for spawning the credential issuer in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_flow_e2e() -> Result<(), anyhow::Error> {
///     let server = TestIssuerServer::spawn().await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestIssuerServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestIssuerServer {
    /// Spawn a server with the standard test LiveKit credentials.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(test_livekit_vars()).await
    }

    /// Spawn a server with no LiveKit credentials at all.
    pub async fn spawn_without_livekit() -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(HashMap::from([(
            "BIND_ADDRESS".to_string(),
            "127.0.0.1:0".to_string(),
        )]))
        .await
    }

    /// Spawn a server from an explicit environment.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0), ignoring `BIND_ADDRESS`
    /// - Use a metrics handle private to this instance
    /// - Start the HTTP server in the background
    pub async fn spawn_with_vars(vars: HashMap<String, String>) -> Result<Self, anyhow::Error> {
        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = Arc::new(AppState::from_config(&config));

        // The global recorder can only be installed once per process
        let metrics_handle = detached_metrics_handle()
            .map_err(|e| anyhow::anyhow!("Failed to build metrics handle: {}", e))?;

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestIssuerServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
