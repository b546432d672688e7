//! Voice agent state as reported by the media platform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State of the remote voice agent in the room.
///
/// Forwarded to the view verbatim; the controller never interprets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Disconnected,
    #[default]
    Connecting,
    Initializing,
    Listening,
    Thinking,
    Speaking,
    Idle,
}

impl AgentState {
    /// Status line shown while a call is connected.
    pub fn status_label(self) -> &'static str {
        match self {
            AgentState::Listening => "Listening...",
            AgentState::Thinking => "Thinking...",
            AgentState::Speaking => "Speaking...",
            AgentState::Idle => "Ready",
            AgentState::Connecting => "Connecting...",
            AgentState::Disconnected => "Disconnected",
            AgentState::Initializing => "Initializing...",
        }
    }

    /// Wire name, also used as the status-dot style class.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentState::Disconnected => "disconnected",
            AgentState::Connecting => "connecting",
            AgentState::Initializing => "initializing",
            AgentState::Listening => "listening",
            AgentState::Thinking => "thinking",
            AgentState::Speaking => "speaking",
            AgentState::Idle => "idle",
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
