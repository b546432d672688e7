//! Credential issuer library.
//!
//! Exposes the issuer's modules so integration tests and the test harness
//! can build the router without going through `main`.

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
