//! # Issuer Test Utilities
//!
//! Shared test utilities for the credential issuer.
//!
//! This crate provides:
//! - Server test harness (`TestIssuerServer` for E2E tests)
//! - LiveKit credential fixtures
//! - Access token verification against those fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use issuer_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestIssuerServer::spawn().await?;
//!     let client = reqwest::Client::new();
//!
//!     let response = client
//!         .post(format!("{}/api/connection-details", server.url()))
//!         .send()
//!         .await?;
//!
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod server_harness;
pub mod tokens;

// Re-export commonly used items
pub use fixtures::*;
pub use server_harness::*;
pub use tokens::*;
