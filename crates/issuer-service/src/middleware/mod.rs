//! HTTP middleware for the credential issuer.

pub mod http_metrics;

pub use http_metrics::http_metrics_middleware;
