//! Connection credential issuance.
//!
//! Turns validated LiveKit credentials into a fresh [`ConnectionDescriptor`]
//! per call: two generated names and a 15-minute room grant signed with the
//! API secret. Nothing is cached or persisted.

use crate::config::LiveKitCredentials;
use crate::crypto;
use crate::errors::IssuerError;
use crate::services::identifiers::{self, RandomSuffix, SuffixGenerator};
use common::jwt::{AccessTokenClaims, VideoGrant, ACCESS_TOKEN_TTL};
use common::types::ConnectionDescriptor;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Issues connection descriptors for new voice calls.
#[derive(Clone)]
pub struct CredentialIssuer {
    credentials: LiveKitCredentials,
    suffixes: Arc<dyn SuffixGenerator>,
    ttl: Duration,
}

impl fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("credentials", &self.credentials)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CredentialIssuer {
    /// Create an issuer with random suffixes and the standard 15-minute TTL.
    pub fn new(credentials: LiveKitCredentials) -> Self {
        Self {
            credentials,
            suffixes: Arc::new(RandomSuffix),
            ttl: ACCESS_TOKEN_TTL,
        }
    }

    /// Replace the suffix generator used for room and participant names.
    #[must_use]
    pub fn with_suffix_generator(mut self, suffixes: Arc<dyn SuffixGenerator>) -> Self {
        self.suffixes = suffixes;
        self
    }

    /// Media server URL handed to clients.
    pub fn server_url(&self) -> &str {
        &self.credentials.server_url
    }

    /// Issue a connection descriptor valid from now.
    pub fn issue_connection(&self) -> Result<ConnectionDescriptor, IssuerError> {
        self.issue_connection_at(chrono::Utc::now().timestamp())
    }

    /// Issue a connection descriptor valid from `issued_at` (Unix seconds).
    #[instrument(skip_all, name = "issuer.connection.issue")]
    pub fn issue_connection_at(&self, issued_at: i64) -> Result<ConnectionDescriptor, IssuerError> {
        let room_name = identifiers::room_name(self.suffixes.as_ref());
        let participant_name = identifiers::participant_name(self.suffixes.as_ref());

        let claims = AccessTokenClaims::new(
            self.credentials.api_key.clone(),
            participant_name.clone(),
            VideoGrant::voice_call(room_name.clone()),
            issued_at,
            self.ttl,
        );

        let participant_token = crypto::sign_access_token(&claims, &self.credentials.api_secret)?;

        debug!(
            target: "issuer.services.credential_issuer",
            room_name = %room_name,
            expires_at = claims.exp,
            "Signed participant access token"
        );

        Ok(ConnectionDescriptor {
            server_url: self.credentials.server_url.clone(),
            room_name,
            participant_name,
            participant_token,
        })
    }
}
