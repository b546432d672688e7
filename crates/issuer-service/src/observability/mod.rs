//! Observability for the credential issuer.
//!
//! Prometheus metrics definitions and recording helpers. Tracing setup lives
//! in `main.rs`.

pub mod metrics;
