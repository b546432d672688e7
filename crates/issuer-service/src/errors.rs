//! Credential issuer error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl and are
//! rendered as a flat `{ "error": "<message>" }` body. Messages returned to
//! clients are fixed strings; underlying causes are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::types::{ErrorBody, CREDENTIALS_NOT_CONFIGURED};
use thiserror::Error;

/// Credential issuer error type.
///
/// Both variants map to 500 Internal Server Error.
#[derive(Debug, Error)]
pub enum IssuerError {
    #[error("LiveKit credentials not configured")]
    CredentialsNotConfigured,

    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl IssuerError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            IssuerError::CredentialsNotConfigured | IssuerError::Signing(_) => 500,
        }
    }

    /// Bounded label for the `error_type` metric dimension.
    pub fn error_type(&self) -> &'static str {
        match self {
            IssuerError::CredentialsNotConfigured => "config",
            IssuerError::Signing(_) => "signing",
        }
    }
}

impl IntoResponse for IssuerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            IssuerError::CredentialsNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                CREDENTIALS_NOT_CONFIGURED.to_string(),
            ),
            IssuerError::Signing(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "issuer.crypto", error = %err, "Token signing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to issue connection credentials".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
