//! Session controller error types.
//!
//! [`CredentialError::user_message`] is what the page shows; the `Display`
//! forms are for logs.

use thiserror::Error;

/// Message shown when the issuer answers with a non-2xx status.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to get connection details";

/// Message shown when no more specific text is available.
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect";

/// Errors from fetching connection details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// Issuer answered with a non-2xx status.
    #[error("Connection details request rejected with status {0}")]
    Rejected(u16),

    /// Request never produced a response.
    #[error("{0}")]
    Transport(String),

    /// Response body was not a connection descriptor.
    #[error("Invalid connection details response: {0}")]
    InvalidResponse(String),

    /// HTTP client could not be built.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CredentialError {
    /// Text for the error region of the page.
    pub fn user_message(&self) -> String {
        match self {
            CredentialError::Rejected(_) => FETCH_FAILED_MESSAGE.to_string(),
            CredentialError::Transport(message) | CredentialError::InvalidResponse(message)
                if !message.is_empty() =>
            {
                message.clone()
            }
            CredentialError::Transport(_)
            | CredentialError::InvalidResponse(_)
            | CredentialError::Configuration(_) => CONNECT_FAILED_MESSAGE.to_string(),
        }
    }
}

/// Errors reported by the media client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Failed to join room: {0}")]
    JoinFailed(String),
}

/// Errors from session controller operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A call is already connecting or connected.
    #[error("A call is already in progress")]
    CallInProgress,

    /// `end_call` ran before connection details arrived.
    #[error("Call ended before it connected")]
    Cancelled,

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error(transparent)]
    Media(#[from] MediaError),
}
