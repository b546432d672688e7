//! Participant access token signing.
//!
//! Tokens are HS256 JWTs keyed by the LiveKit API secret. The issuer only
//! signs; the media server is the party that verifies them.

use crate::errors::IssuerError;
use common::jwt::AccessTokenClaims;
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::instrument;

/// Sign participant access token claims with the LiveKit API secret (HS256).
#[instrument(skip_all)]
pub fn sign_access_token(
    claims: &AccessTokenClaims,
    api_secret: &SecretString,
) -> Result<String, IssuerError> {
    let encoding_key = EncodingKey::from_secret(api_secret.expose_secret().as_bytes());

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &encoding_key)
        .map_err(|e| IssuerError::Signing(format!("JWT signing operation failed: {}", e)))
}

/// Verify a token the way the media server does: HS256 signature, issuer
/// equal to `api_key`, and the validity window with no leeway.
#[cfg(test)]
pub(crate) fn verify_access_token(
    token: &str,
    api_key: &str,
    api_secret: &SecretString,
) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    let decoding_key = DecodingKey::from_secret(api_secret.expose_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_issuer(&[api_key]);
    validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

    decode::<AccessTokenClaims>(token, &decoding_key, &validation).map(|data| data.claims)
}
