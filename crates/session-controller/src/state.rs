//! Session lifecycle state.

use common::types::ConnectionDescriptor;

/// Where the client is in the call lifecycle.
///
/// An error can only be carried while idle; a connected session has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No call. `error` holds the message from the last failed attempt.
    Idle { error: Option<String> },

    /// Waiting for connection details.
    Connecting,

    /// Connection details received and handed to the media client.
    Connected(ConnectionDescriptor),
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Idle { error: None }
    }
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle { .. })
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self, SessionState::Connecting)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, SessionState::Connected(_))
    }

    /// Error message to display, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Active connection details, if connected.
    pub fn descriptor(&self) -> Option<&ConnectionDescriptor> {
        match self {
            SessionState::Connected(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}
