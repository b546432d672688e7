//! Connection details handler.
//!
//! `POST /api/connection-details` mints a fresh room, participant identity
//! and access token. The request body is ignored.

use crate::errors::IssuerError;
use crate::observability::metrics::{record_connection_issuance, record_error};
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use common::types::ConnectionDescriptor;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Handler for POST /api/connection-details
///
/// # Response
///
/// - 200 OK with a [`ConnectionDescriptor`] (camelCase JSON)
/// - 500 `{"error": "LiveKit credentials not configured"}` when any LiveKit
///   variable is missing
/// - 500 `{"error": "Failed to issue connection credentials"}` when signing fails
#[instrument(
    skip_all,
    name = "issuer.connection.create",
    fields(status = tracing::field::Empty)
)]
pub async fn create_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConnectionDescriptor>, IssuerError> {
    let start = Instant::now();

    let result = match state.issuer.as_ref() {
        Some(issuer) => issuer.issue_connection(),
        None => Err(IssuerError::CredentialsNotConfigured),
    };

    let duration = start.elapsed();
    match result {
        Ok(descriptor) => {
            tracing::Span::current().record("status", "success");
            record_connection_issuance("success", duration);
            tracing::info!(
                target: "issuer.handlers.connection",
                room_name = %descriptor.room_name,
                participant_name = %descriptor.participant_name,
                "Issued connection details"
            );
            Ok(Json(descriptor))
        }
        Err(e) => {
            tracing::Span::current().record("status", "error");
            record_connection_issuance("error", duration);
            record_error("create_connection", e.error_type(), e.status_code());
            tracing::warn!(
                target: "issuer.handlers.connection",
                error = %e,
                "Failed to issue connection details"
            );
            Err(e)
        }
    }
}
