//! Wire types shared between the credential issuer and its clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Room name prefix for generated voice rooms.
pub const ROOM_NAME_PREFIX: &str = "voice-room-";

/// Participant identity prefix for generated callers.
pub const PARTICIPANT_NAME_PREFIX: &str = "user-";

/// Error message returned when the issuer has no LiveKit credentials.
pub const CREDENTIALS_NOT_CONFIGURED: &str = "LiveKit credentials not configured";

/// Everything a client needs to join a voice room.
///
/// Created fresh for every call attempt and never reused. The participant
/// token is redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDescriptor {
    /// Media server URL, copied verbatim from issuer configuration.
    pub server_url: String,

    /// Generated room name (`voice-room-xxxxxxx`).
    pub room_name: String,

    /// Generated participant identity (`user-xxxxxxx`).
    pub participant_name: String,

    /// Signed access token granting entry to `room_name`.
    pub participant_token: String,
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("server_url", &self.server_url)
            .field("room_name", &self.room_name)
            .field("participant_name", &self.participant_name)
            .field("participant_token", &"[REDACTED]")
            .finish()
    }
}

/// Error body returned by the issuer on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
