//! Common types shared by the Shams credential issuer and session controller.

#![warn(clippy::pedantic)]

/// Module for wire types exchanged between issuer and client
pub mod types;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for access token claims and grant types
pub mod jwt;
