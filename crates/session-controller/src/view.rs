//! Page projection of session and agent state.
//!
//! Pure function of its inputs; the UI layer only draws what is here.

use crate::agent_state::AgentState;
use crate::state::SessionState;

pub const TITLE: &str = "Shams";
pub const SUBTITLE: &str = "Your bright AI companion";
pub const START_LABEL: &str = "Start Voice Call";
pub const CONNECTING_LABEL: &str = "Connecting...";
pub const START_HINT: &str = "Click to start talking with Shams";
pub const END_CALL_LABEL: &str = "End Call";

/// Bars in the audio visualizer (handed to the external visualizer).
pub const VISUALIZER_BAR_COUNT: usize = 7;

/// Start button as rendered before a call is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartButton {
    pub label: &'static str,
    pub enabled: bool,
    /// Spinner shown next to the label while connecting.
    pub busy: bool,
}

/// Connected-call panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPanel {
    /// Agent state, also the status-dot style class.
    pub agent_state: AgentState,
    pub visualizer_bars: usize,
    pub end_call_label: &'static str,
}

/// Everything the page renders for one (session, agent) state pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub title: &'static str,
    pub subtitle: &'static str,

    /// Error region text; hidden when `None`.
    pub error: Option<String>,

    /// Start section, shown until connected.
    pub start_button: Option<StartButton>,
    pub hint: Option<&'static str>,

    /// Status line, shown only while connected.
    pub status: Option<&'static str>,
    pub call: Option<CallPanel>,
}

impl SessionView {
    pub fn project(state: &SessionState, agent_state: AgentState) -> Self {
        let start_button = match state {
            SessionState::Idle { .. } => Some(StartButton {
                label: START_LABEL,
                enabled: true,
                busy: false,
            }),
            SessionState::Connecting => Some(StartButton {
                label: CONNECTING_LABEL,
                enabled: false,
                busy: true,
            }),
            SessionState::Connected(_) => None,
        };

        let call = state.is_connected().then_some(CallPanel {
            agent_state,
            visualizer_bars: VISUALIZER_BAR_COUNT,
            end_call_label: END_CALL_LABEL,
        });

        Self {
            title: TITLE,
            subtitle: SUBTITLE,
            error: state.error().map(str::to_string),
            hint: start_button.map(|_| START_HINT),
            start_button,
            status: call.map(|panel| panel.agent_state.status_label()),
            call,
        }
    }
}
