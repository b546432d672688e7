//! HTTP request handlers for the credential issuer.

pub mod connection;
pub mod health;
pub mod metrics;

pub use connection::create_connection;
pub use health::{health_check, readiness_check};
pub use metrics::metrics_handler;
