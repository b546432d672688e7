//! Access token claims for LiveKit-compatible room grants.
//!
//! This module provides:
//! - The `video` grant structure carried inside participant tokens
//! - The full claim set (`iss`, `sub`, `jti`, `nbf`, `exp`, `video`)
//! - Token lifetime constants
//! - Unverified claim extraction for logging on the client side
//!
//! Signing lives in the issuer service and verification in the media server;
//! only they hold the API secret.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing
//! - `sub` and `jti` carry the participant identity and are redacted in Debug
//! - [`peek_claims`] does NOT verify signatures and must never gate access

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Lifetime of a participant access token (15 minutes).
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(900);

/// Maximum JWT size accepted by [`peek_claims`] (8KB).
///
/// Issued tokens are ~400 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192;

// =============================================================================
// Error Types
// =============================================================================

/// Errors from reading token claims.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    /// Token size exceeds maximum allowed.
    #[error("Access token is too large")]
    TokenTooLarge,

    /// Token is not a structurally valid JWT.
    #[error("Access token is malformed")]
    MalformedToken,
}

// =============================================================================
// Claims Types
// =============================================================================

/// Room permissions encoded in the `video` claim.
///
/// Field names follow the media platform's camelCase wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoGrant {
    /// Permission to join `room`.
    pub room_join: bool,

    /// Room this grant is scoped to.
    pub room: String,

    /// Permission to publish audio/video tracks.
    pub can_publish: bool,

    /// Permission to subscribe to other participants' tracks.
    pub can_subscribe: bool,

    /// Permission to publish data messages.
    pub can_publish_data: bool,
}

impl VideoGrant {
    /// Full participant grant for a voice call in `room`.
    #[must_use]
    pub fn voice_call(room: impl Into<String>) -> Self {
        Self {
            room_join: true,
            room: room.into(),
            can_publish: true,
            can_subscribe: true,
            can_publish_data: true,
        }
    }
}

/// Claims carried by a participant access token.
///
/// # Fields
///
/// - `iss`: API key that signed the token
/// - `sub`: participant identity
/// - `jti`: token id (the participant identity)
/// - `nbf`: not-before timestamp (Unix epoch seconds, issuance time)
/// - `exp`: expiration timestamp (Unix epoch seconds)
/// - `video`: room grant
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    pub sub: String,
    pub jti: String,
    pub nbf: i64,
    pub exp: i64,
    pub video: VideoGrant,
}

impl fmt::Debug for AccessTokenClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenClaims")
            .field("iss", &self.iss)
            .field("sub", &"[REDACTED]")
            .field("jti", &"[REDACTED]")
            .field("nbf", &self.nbf)
            .field("exp", &self.exp)
            .field("video", &self.video)
            .finish()
    }
}

impl AccessTokenClaims {
    /// Build claims for `identity`, valid from `issued_at` for `ttl`.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        identity: impl Into<String>,
        video: VideoGrant,
        issued_at: i64,
        ttl: Duration,
    ) -> Self {
        let identity = identity.into();
        // ttl is a small constant; the cast cannot wrap
        #[allow(clippy::cast_possible_wrap)]
        let ttl_secs = ttl.as_secs() as i64;

        Self {
            iss: api_key.into(),
            sub: identity.clone(),
            jti: identity,
            nbf: issued_at,
            exp: issued_at + ttl_secs,
            video,
        }
    }

    /// Whether the grant is usable at `now` (Unix epoch seconds).
    ///
    /// Valid on `[nbf, exp)`.
    #[must_use]
    pub fn is_valid_at(&self, now: i64) -> bool {
        now >= self.nbf && now < self.exp
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Read the claims of a token without verifying its signature.
///
/// Clients do not hold the API secret, so this is only suitable for
/// diagnostics such as logging when a token expires.
///
/// # Errors
///
/// - `TokenTooLarge` - Token exceeds `MAX_JWT_SIZE_BYTES`
/// - `MalformedToken` - Wrong segment count, bad base64, or bad claim JSON
pub fn peek_claims(token: &str) -> Result<AccessTokenClaims, JwtError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtError::TokenTooLarge);
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::MalformedToken);
    }

    let payload_part = parts.get(1).ok_or(JwtError::MalformedToken)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT payload base64");
        JwtError::MalformedToken
    })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT claims JSON");
        JwtError::MalformedToken
    })
}
