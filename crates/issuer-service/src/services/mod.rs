//! Business logic for the credential issuer.

pub mod credential_issuer;
pub mod identifiers;

pub use credential_issuer::CredentialIssuer;
pub use identifiers::{RandomSuffix, SuffixGenerator};
