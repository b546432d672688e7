//! Credential issuer configuration.
//!
//! Configuration is loaded once from environment variables at startup. The
//! LiveKit settings are optional at load time and validated separately by
//! [`Config::livekit_credentials`], so a service without them still starts
//! and reports itself not ready. The API secret is redacted in Debug output.

use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Environment variable names for the LiveKit settings.
pub const LIVEKIT_URL_VAR: &str = "LIVEKIT_URL";
pub const LIVEKIT_API_KEY_VAR: &str = "LIVEKIT_API_KEY";
pub const LIVEKIT_API_SECRET_VAR: &str = "LIVEKIT_API_SECRET";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Credential issuer configuration.
#[derive(Clone)]
pub struct Config {
    /// Server bind address (default: "0.0.0.0:3000").
    pub bind_address: SocketAddr,

    /// LiveKit server URL handed to clients verbatim.
    pub livekit_url: Option<String>,

    /// LiveKit API key, used as the token issuer.
    pub livekit_api_key: Option<String>,

    /// LiveKit API secret, used as the HS256 signing key.
    pub livekit_api_secret: Option<SecretString>,

    /// Log output format (default: text).
    pub log_format: LogFormat,

    /// Seconds to keep serving after a shutdown signal (default: 0).
    pub drain_seconds: u64,
}

/// Custom Debug implementation that redacts the API secret.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("livekit_url", &self.livekit_url)
            .field("livekit_api_key", &self.livekit_api_key)
            .field(
                "livekit_api_secret",
                &self.livekit_api_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("log_format", &self.log_format)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid bind address '{value}': {reason}")]
    InvalidBindAddress { value: String, reason: String },

    #[error("Invalid LOG_FORMAT '{0}': expected 'text' or 'json'")]
    InvalidLogFormat(String),

    #[error("Invalid DRAIN_SECONDS '{0}': expected a non-negative integer")]
    InvalidDrainSeconds(String),

    #[error("LiveKit credentials not configured (missing: {})", .0.join(", "))]
    LiveKitNotConfigured(Vec<&'static str>),
}

/// Validated LiveKit settings.
///
/// Holding one of these means all three values were present at startup.
#[derive(Clone)]
pub struct LiveKitCredentials {
    pub server_url: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

impl fmt::Debug for LiveKitCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitCredentials")
            .field("server_url", &self.server_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_value = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address =
            bind_value
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::InvalidBindAddress {
                    value: bind_value.clone(),
                    reason: e.to_string(),
                })?;

        let log_format = match vars.get("LOG_FORMAT").map(|s| s.to_ascii_lowercase()) {
            None => LogFormat::Text,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => return Err(ConfigError::InvalidLogFormat(v)),
        };

        let drain_seconds = match vars.get("DRAIN_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDrainSeconds(v.clone()))?,
            None => 0,
        };

        // Empty values count as absent
        let non_empty = |name: &str| vars.get(name).filter(|v| !v.is_empty()).cloned();

        Ok(Config {
            bind_address,
            livekit_url: non_empty(LIVEKIT_URL_VAR),
            livekit_api_key: non_empty(LIVEKIT_API_KEY_VAR),
            livekit_api_secret: non_empty(LIVEKIT_API_SECRET_VAR).map(SecretString::from),
            log_format,
            drain_seconds,
        })
    }

    /// Validate the LiveKit settings into a ready-to-use credential set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LiveKitNotConfigured` naming every missing variable.
    pub fn livekit_credentials(&self) -> Result<LiveKitCredentials, ConfigError> {
        match (
            &self.livekit_url,
            &self.livekit_api_key,
            &self.livekit_api_secret,
        ) {
            (Some(server_url), Some(api_key), Some(api_secret)) => Ok(LiveKitCredentials {
                server_url: server_url.clone(),
                api_key: api_key.clone(),
                api_secret: api_secret.clone(),
            }),
            _ => {
                let mut missing = Vec::new();
                if self.livekit_url.is_none() {
                    missing.push(LIVEKIT_URL_VAR);
                }
                if self.livekit_api_key.is_none() {
                    missing.push(LIVEKIT_API_KEY_VAR);
                }
                if self.livekit_api_secret.is_none() {
                    missing.push(LIVEKIT_API_SECRET_VAR);
                }
                Err(ConfigError::LiveKitNotConfigured(missing))
            }
        }
    }
}
