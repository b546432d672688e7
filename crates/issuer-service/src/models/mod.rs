//! Response models for the credential issuer's operational endpoints.
//!
//! The connection descriptor itself lives in `common::types` since the
//! session controller deserializes the same shape.

use serde::Serialize;

/// Readiness probe response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// LiveKit credential status ("configured" or "not_configured").
    pub livekit: &'static str,

    /// Error message (generic, never names the missing variables).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
