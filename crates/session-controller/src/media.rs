//! Media client seam.
//!
//! The real-time transport (signaling, audio capture and playback) is an
//! external collaborator. The controller only needs to join a room, observe
//! the agent state, and leave.

use crate::agent_state::AgentState;
use crate::errors::MediaError;
use common::secret::SecretString;
use std::fmt;
use tokio::sync::watch;

/// Parameters for joining a room.
#[derive(Clone)]
pub struct JoinOptions {
    /// Media server URL from the connection descriptor.
    pub server_url: String,

    /// Participant access token.
    pub token: SecretString,

    /// Connect immediately rather than waiting for an explicit connect.
    pub auto_connect: bool,

    /// Publish the local microphone.
    pub audio_enabled: bool,
}

impl JoinOptions {
    /// Options for a voice call: auto-connect and audio publishing on.
    pub fn voice_call(server_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            server_url: server_url.into(),
            token,
            auto_connect: true,
            audio_enabled: true,
        }
    }
}

impl fmt::Debug for JoinOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinOptions")
            .field("server_url", &self.server_url)
            .field("token", &"[REDACTED]")
            .field("auto_connect", &self.auto_connect)
            .field("audio_enabled", &self.audio_enabled)
            .finish()
    }
}

/// Identifies one joined media session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaSessionId(pub u64);

impl fmt::Display for MediaSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media-{}", self.0)
    }
}

/// A joined media session.
///
/// The session is over when the sender side of `agent_state` is dropped;
/// that is how a remote disconnect or transport failure is reported.
#[derive(Debug)]
pub struct MediaSession {
    pub id: MediaSessionId,
    pub agent_state: watch::Receiver<AgentState>,
}

/// Media client operations (enables mocking).
#[async_trait::async_trait]
pub trait MediaClient: Send + Sync {
    /// Join the room described by `options`.
    async fn join(&self, options: JoinOptions) -> Result<MediaSession, MediaError>;

    /// Leave the given session. No-op if it has already ended.
    async fn disconnect(&self, session: MediaSessionId);
}

/// Mock media client module for testing.
pub mod mock {
    use super::*;
    use common::secret::ExposeSecret;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Mutex, Notify};

    /// A join the mock received, with the token exposed for assertions.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedJoin {
        pub server_url: String,
        pub token: String,
        pub auto_connect: bool,
        pub audio_enabled: bool,
    }

    /// Mock media client for unit testing.
    ///
    /// Each successful join opens a new agent-state channel; tests drive the
    /// most recent one through [`MockMediaClient::set_agent_state`] and end it
    /// with [`MockMediaClient::drop_session`].
    pub struct MockMediaClient {
        /// Live sessions, oldest first.
        sessions: Mutex<Vec<(MediaSessionId, watch::Sender<AgentState>)>>,
        /// Joins received, in order.
        joins: Mutex<Vec<RecordedJoin>>,
        /// Gate the next join waits on before completing.
        join_gate: Mutex<Option<Arc<Notify>>>,
        next_id: AtomicU64,
        /// Number of disconnect calls.
        disconnect_count: AtomicUsize,
        /// Whether joins fail.
        fail_join: bool,
        /// Whether the next join fails.
        fail_next_join: AtomicBool,
    }

    impl MockMediaClient {
        /// Create a mock whose joins succeed.
        pub fn connecting() -> Self {
            Self {
                sessions: Mutex::new(Vec::new()),
                joins: Mutex::new(Vec::new()),
                join_gate: Mutex::new(None),
                next_id: AtomicU64::new(1),
                disconnect_count: AtomicUsize::new(0),
                fail_join: false,
                fail_next_join: AtomicBool::new(false),
            }
        }

        /// Create a mock whose joins fail.
        pub fn failing() -> Self {
            Self {
                fail_join: true,
                ..Self::connecting()
            }
        }

        /// Hold the next join (after it is recorded) until `gate` is notified.
        pub async fn gate_next_join(&self, gate: Arc<Notify>) {
            *self.join_gate.lock().await = Some(gate);
        }

        /// Make only the next join fail.
        pub fn fail_next_join(&self) {
            self.fail_next_join.store(true, Ordering::SeqCst);
        }

        /// Push an agent state into the most recent live session.
        ///
        /// Returns false if there is no live session.
        pub async fn set_agent_state(&self, state: AgentState) -> bool {
            match self.sessions.lock().await.last() {
                Some((_, sender)) => sender.send(state).is_ok(),
                None => false,
            }
        }

        /// End the most recent live session from the remote side.
        pub async fn drop_session(&self) {
            self.sessions.lock().await.pop();
        }

        /// Number of sessions joined and not yet ended.
        pub async fn live_sessions(&self) -> usize {
            self.sessions.lock().await.len()
        }

        /// Joins received so far.
        pub async fn joins(&self) -> Vec<RecordedJoin> {
            self.joins.lock().await.clone()
        }

        /// Number of `disconnect` calls made.
        pub fn disconnect_count(&self) -> usize {
            self.disconnect_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl MediaClient for MockMediaClient {
        async fn join(&self, options: JoinOptions) -> Result<MediaSession, MediaError> {
            self.joins.lock().await.push(RecordedJoin {
                server_url: options.server_url.clone(),
                token: options.token.expose_secret().to_string(),
                auto_connect: options.auto_connect,
                audio_enabled: options.audio_enabled,
            });

            let fail = self.fail_join || self.fail_next_join.swap(false, Ordering::SeqCst);
            let gate = self.join_gate.lock().await.take();
            if let Some(gate) = gate {
                gate.notified().await;
            }

            if fail {
                return Err(MediaError::JoinFailed("Mock media client error".to_string()));
            }

            let id = MediaSessionId(self.next_id.fetch_add(1, Ordering::SeqCst));
            let (sender, receiver) = watch::channel(AgentState::Connecting);
            self.sessions.lock().await.push((id, sender));
            Ok(MediaSession {
                id,
                agent_state: receiver,
            })
        }

        async fn disconnect(&self, session: MediaSessionId) {
            self.disconnect_count.fetch_add(1, Ordering::SeqCst);
            self.sessions.lock().await.retain(|(id, _)| *id != session);
        }
    }

}
