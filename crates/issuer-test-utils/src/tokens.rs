//! Access token verification for end-to-end tests.
//!
//! Checks issued tokens the way the media server would, against the fixture
//! credentials in [`crate::fixtures`].

use crate::fixtures::{TEST_API_KEY, TEST_API_SECRET};
use common::jwt::AccessTokenClaims;
use jsonwebtoken::errors::Error as JwtError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

/// Verify a token issued by a [`crate::TestIssuerServer`].
///
/// Requires an HS256 signature under `TEST_API_SECRET`, `iss == TEST_API_KEY`
/// and a current validity window (no leeway).
pub fn verify_issued_token(token: &str) -> Result<AccessTokenClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_issuer(&[TEST_API_KEY]);
    validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);

    decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(TEST_API_SECRET.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}
