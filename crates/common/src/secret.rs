//! Secret types for protecting sensitive values from accidental logging.
//!
//! This module re-exports types from the [`secrecy`] crate. Use these types
//! for the LiveKit API secret and for participant tokens held in memory.
//!
//! `SecretString` implements `Debug` with redaction, so any struct deriving
//! `Debug` that holds one gets safe logging behavior for free. Secrets are
//! zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct ApiCredentials {
//!     api_key: String,
//!     api_secret: SecretString,
//! }
//!
//! let creds = ApiCredentials {
//!     api_key: "APIxyz".to_string(),
//!     api_secret: SecretString::from("very-secret"),
//! };
//!
//! // Safe: api_secret is redacted
//! println!("{:?}", creds);
//!
//! let secret: &str = creds.api_secret.expose_secret();
//! ```

pub use secrecy::{ExposeSecret, SecretString};
