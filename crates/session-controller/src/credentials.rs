//! Connection details client.
//!
//! Fetches a [`ConnectionDescriptor`] from the credential issuer with a
//! bodiless `POST /api/connection-details`. No retries; failures surface to
//! the controller as [`CredentialError`].

use crate::errors::CredentialError;
use common::types::ConnectionDescriptor;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Path of the connection details endpoint, relative to the issuer base URL.
pub const CONNECTION_DETAILS_PATH: &str = "/api/connection-details";

/// Source of connection details (enables mocking).
#[async_trait::async_trait]
pub trait CredentialSource: Send + Sync {
    /// Request a fresh connection descriptor.
    async fn fetch_connection_details(&self) -> Result<ConnectionDescriptor, CredentialError>;
}

/// HTTP client for the credential issuer.
#[derive(Debug, Clone)]
pub struct HttpCredentialClient {
    endpoint: String,
    http_client: reqwest::Client,
}

impl HttpCredentialClient {
    /// Create a client for the issuer at `base_url` (e.g. `http://localhost:3000`).
    ///
    /// Uses the HTTP client's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, CredentialError> {
        let http_client = reqwest::Client::builder().build().map_err(|e| {
            CredentialError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self::with_http_client(base_url, http_client))
    }

    /// Create a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Configuration` if the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CredentialError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CredentialError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self::with_http_client(base_url, http_client))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            endpoint: format!(
                "{}{}",
                base_url.trim_end_matches('/'),
                CONNECTION_DETAILS_PATH
            ),
            http_client,
        }
    }

    /// Full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl CredentialSource for HttpCredentialClient {
    #[instrument(skip_all, name = "session.credentials.fetch")]
    async fn fetch_connection_details(&self) -> Result<ConnectionDescriptor, CredentialError> {
        debug!(
            target: "session.credentials",
            url = %self.endpoint,
            "Requesting connection details"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "session.credentials", error = %e, "HTTP request failed");
                CredentialError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                target: "session.credentials",
                status = %status,
                "Connection details request rejected"
            );
            return Err(CredentialError::Rejected(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            warn!(target: "session.credentials", error = %e, "Failed to read response body");
            CredentialError::Transport(e.to_string())
        })?;

        // The parse error's text is what the user sees
        let descriptor: ConnectionDescriptor = serde_json::from_str(&body).map_err(|e| {
            warn!(
                target: "session.credentials",
                error = %e,
                "Failed to parse connection details"
            );
            CredentialError::InvalidResponse(e.to_string())
        })?;

        debug!(
            target: "session.credentials",
            room_name = %descriptor.room_name,
            "Connection details received"
        );

        Ok(descriptor)
    }
}
