//! Session controller.
//!
//! Drives `Idle -> Connecting -> Connected | Idle(error)` and back to idle
//! on `end_call` or remote disconnect. State is published on watch channels
//! so a UI can render without polling.
//!
//! One background task per live session forwards agent state from the media
//! client and detects the end of the session. No reconnection is attempted.

use crate::agent_state::AgentState;
use crate::credentials::CredentialSource;
use crate::errors::SessionError;
use crate::media::{JoinOptions, MediaClient, MediaSessionId};
use crate::state::SessionState;
use crate::view::SessionView;
use common::jwt::peek_claims;
use common::secret::SecretString;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Attempt id meaning "no call in progress".
const NO_ATTEMPT: u64 = 0;

/// The joined media session and the task forwarding its agent state.
struct ActiveSession {
    media_session: MediaSessionId,
    task: JoinHandle<()>,
}

/// Client-side voice call lifecycle.
pub struct SessionController {
    credentials: Arc<dyn CredentialSource>,
    media: Arc<dyn MediaClient>,
    state_tx: watch::Sender<SessionState>,
    agent_tx: watch::Sender<AgentState>,
    /// Id of the call that owns the current non-idle state.
    ///
    /// Only written inside `state_tx` modify closures, so it always changes
    /// together with the state it describes.
    current_attempt: Arc<AtomicU64>,
    next_attempt: AtomicU64,
    active: Mutex<Option<ActiveSession>>,
}

impl SessionController {
    /// Create an idle controller.
    pub fn new(credentials: Arc<dyn CredentialSource>, media: Arc<dyn MediaClient>) -> Self {
        Self {
            credentials,
            media,
            state_tx: watch::Sender::new(SessionState::default()),
            agent_tx: watch::Sender::new(AgentState::default()),
            current_attempt: Arc::new(AtomicU64::new(NO_ATTEMPT)),
            next_attempt: AtomicU64::new(NO_ATTEMPT + 1),
            active: Mutex::new(None),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Current agent state (meaningful only while connected).
    pub fn agent_state(&self) -> AgentState {
        *self.agent_tx.borrow()
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to agent state changes.
    pub fn subscribe_agent_state(&self) -> watch::Receiver<AgentState> {
        self.agent_tx.subscribe()
    }

    /// Render the current state.
    pub fn view(&self) -> SessionView {
        SessionView::project(&self.state_tx.borrow(), self.agent_state())
    }

    /// Start a call: fetch connection details, then join the room.
    ///
    /// Each call gets its own attempt id. Once `end_call` (or a newer call)
    /// takes over, this call leaves state alone and disconnects anything it
    /// joined.
    ///
    /// # Errors
    ///
    /// - `SessionError::CallInProgress` - not idle; state is left untouched
    /// - `SessionError::Credentials` - fetch failed; state is `Idle` with the
    ///   user-facing message
    /// - `SessionError::Media` - join failed; state is `Idle` without a message
    /// - `SessionError::Cancelled` - `end_call` ran while connecting
    #[instrument(skip_all, name = "session.call.start")]
    pub async fn start_call(&self) -> Result<(), SessionError> {
        let attempt = self.next_attempt.fetch_add(1, Ordering::Relaxed);

        // Check-and-set so concurrent starts cannot both proceed
        let started = self.state_tx.send_if_modified(|state| {
            if state.is_idle() {
                *state = SessionState::Connecting;
                self.current_attempt.store(attempt, Ordering::SeqCst);
                true
            } else {
                false
            }
        });
        if !started {
            debug!(target: "session.controller", "Call already in progress");
            return Err(SessionError::CallInProgress);
        }

        let descriptor = match self.credentials.fetch_connection_details().await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(target: "session.controller", error = %e, "Failed to start call");
                self.transition_if_current(
                    attempt,
                    SessionState::Idle {
                        error: Some(e.user_message()),
                    },
                );
                return Err(e.into());
            }
        };

        match peek_claims(&descriptor.participant_token) {
            Ok(claims) => debug!(
                target: "session.controller",
                room_name = %descriptor.room_name,
                expires_at = claims.exp,
                "Connection details received"
            ),
            Err(e) => debug!(
                target: "session.controller",
                error = %e,
                "Participant token is opaque"
            ),
        }

        let options = JoinOptions::voice_call(
            descriptor.server_url.clone(),
            SecretString::from(descriptor.participant_token.clone()),
        );
        let room_name = descriptor.room_name.clone();

        if !self.transition_if_current(attempt, SessionState::Connected(descriptor)) {
            debug!(target: "session.controller", "Call ended before details arrived");
            return Err(SessionError::Cancelled);
        }

        let session = match self.media.join(options).await {
            Ok(session) => session,
            Err(e) => {
                warn!(target: "session.controller", error = %e, "Media client failed to join");
                self.transition_if_current(attempt, SessionState::Idle { error: None });
                return Err(e.into());
            }
        };

        // Holding the slot keeps end_call from ending this attempt until the
        // forwarding task is installed.
        let mut active = self.active.lock().await;
        if self.current_attempt.load(Ordering::SeqCst) != attempt {
            drop(active);
            debug!(
                target: "session.controller",
                media_session = %session.id,
                "Call ended while joining"
            );
            self.media.disconnect(session.id).await;
            return Err(SessionError::Cancelled);
        }

        let task = tokio::spawn(forward_session(
            session.agent_state,
            self.agent_tx.clone(),
            self.state_tx.clone(),
            self.current_attempt.clone(),
            attempt,
        ));
        if let Some(previous) = active.replace(ActiveSession {
            media_session: session.id,
            task,
        }) {
            previous.task.abort();
        }

        info!(
            target: "session.controller",
            room_name = %room_name,
            media_session = %session.id,
            "Call connected"
        );
        Ok(())
    }

    /// End the call and return to idle without an error.
    ///
    /// No-op when already idle.
    #[instrument(skip_all, name = "session.call.end")]
    pub async fn end_call(&self) {
        let mut active = self.active.lock().await;

        let was_active = self.state_tx.send_if_modified(|state| {
            if state.is_idle() {
                false
            } else {
                *state = SessionState::Idle { error: None };
                self.current_attempt.store(NO_ATTEMPT, Ordering::SeqCst);
                true
            }
        });

        let ended = active.take();
        drop(active);
        if let Some(ended) = &ended {
            ended.task.abort();
        }

        if was_active {
            if let Some(ended) = ended {
                self.media.disconnect(ended.media_session).await;
            }
            self.agent_tx.send_replace(AgentState::default());
            info!(target: "session.controller", "Call ended");
        }
    }

    fn transition_if_current(&self, attempt: u64, next: SessionState) -> bool {
        transition_if_current(&self.state_tx, &self.current_attempt, attempt, next)
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.task.abort();
        }
    }
}

/// Replace the state only while `attempt` still owns it.
///
/// Moving to `Idle` releases ownership.
fn transition_if_current(
    state_tx: &watch::Sender<SessionState>,
    current_attempt: &AtomicU64,
    attempt: u64,
    next: SessionState,
) -> bool {
    state_tx.send_if_modified(|state| {
        if current_attempt.load(Ordering::SeqCst) != attempt {
            return false;
        }
        if next.is_idle() {
            current_attempt.store(NO_ATTEMPT, Ordering::SeqCst);
        }
        *state = next;
        true
    })
}

/// Forward agent state until the media client closes the session, then
/// return to idle if this session still owns the state.
async fn forward_session(
    mut agent_rx: watch::Receiver<AgentState>,
    agent_tx: watch::Sender<AgentState>,
    state_tx: watch::Sender<SessionState>,
    current_attempt: Arc<AtomicU64>,
    attempt: u64,
) {
    let initial = *agent_rx.borrow_and_update();
    agent_tx.send_replace(initial);

    while agent_rx.changed().await.is_ok() {
        let agent_state = *agent_rx.borrow_and_update();
        debug!(target: "session.controller", agent_state = %agent_state, "Agent state changed");
        agent_tx.send_replace(agent_state);
    }

    info!(target: "session.controller", "Media session closed");
    if transition_if_current(
        &state_tx,
        &current_attempt,
        attempt,
        SessionState::Idle { error: None },
    ) {
        agent_tx.send_replace(AgentState::default());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::errors::CredentialError;
    use crate::media::mock::MockMediaClient;
    use common::types::ConnectionDescriptor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    fn descriptor() -> ConnectionDescriptor {
        ConnectionDescriptor {
            server_url: "wss://shams.livekit.cloud".to_string(),
            room_name: "voice-room-abc1234".to_string(),
            participant_name: "user-xyz7890".to_string(),
            participant_token: "header.payload.signature".to_string(),
        }
    }

    /// Credential source with a fixed outcome and an optional gate.
    struct StubCredentials {
        result: Result<ConnectionDescriptor, CredentialError>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl StubCredentials {
        fn ok() -> Self {
            Self {
                result: Ok(descriptor()),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn err(error: CredentialError) -> Self {
            Self {
                result: Err(error),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::ok()
            }
        }
    }

    #[async_trait::async_trait]
    impl CredentialSource for StubCredentials {
        async fn fetch_connection_details(&self) -> Result<ConnectionDescriptor, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.result.clone()
        }
    }

    fn setup(
        credentials: StubCredentials,
    ) -> (Arc<SessionController>, Arc<MockMediaClient>, Arc<StubCredentials>) {
        let credentials = Arc::new(credentials);
        let media = Arc::new(MockMediaClient::connecting());
        let controller = Arc::new(SessionController::new(credentials.clone(), media.clone()));
        (controller, media, credentials)
    }

    async fn wait_for<F>(rx: &mut watch::Receiver<SessionState>, predicate: F)
    where
        F: FnMut(&SessionState) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(predicate))
            .await
            .expect("state change timed out")
            .expect("state channel closed");
    }

    #[tokio::test]
    async fn test_start_call_connects_and_joins() {
        let (controller, media, _) = setup(StubCredentials::ok());

        controller.start_call().await.unwrap();

        assert_eq!(controller.state(), SessionState::Connected(descriptor()));
        let joins = media.joins().await;
        assert_eq!(joins.len(), 1);
        assert_eq!(joins.first().unwrap().server_url, "wss://shams.livekit.cloud");
        assert_eq!(joins.first().unwrap().token, "header.payload.signature");
        assert!(joins.first().unwrap().auto_connect);
        assert!(joins.first().unwrap().audio_enabled);
    }

    #[tokio::test]
    async fn test_start_call_failure_sets_error() {
        let (controller, media, _) = setup(StubCredentials::err(CredentialError::Rejected(500)));

        let result = controller.start_call().await;

        assert!(matches!(result, Err(SessionError::Credentials(_))));
        assert_eq!(
            controller.state(),
            SessionState::Idle {
                error: Some("Failed to get connection details".to_string())
            }
        );
        assert!(media.joins().await.is_empty());
    }

    #[tokio::test]
    async fn test_retry_clears_previous_error() {
        let gate = Arc::new(Notify::new());
        let (controller, _, _) = setup(StubCredentials::gated(gate.clone()));
        controller.state_tx.send_replace(SessionState::Idle {
            error: Some("Failed to get connection details".to_string()),
        });

        let mut rx = controller.subscribe();
        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.start_call().await }
        });

        wait_for(&mut rx, SessionState::is_connecting).await;
        assert_eq!(controller.state().error(), None);
        assert_eq!(controller.view().error, None);

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(controller.state().is_connected());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let gate = Arc::new(Notify::new());
        let (controller, _, credentials) = setup(StubCredentials::gated(gate.clone()));

        let mut rx = controller.subscribe();
        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.start_call().await }
        });
        wait_for(&mut rx, SessionState::is_connecting).await;

        let second = controller.start_call().await;
        assert_eq!(second, Err(SessionError::CallInProgress));
        assert!(controller.state().is_connecting());

        gate.notify_one();
        first.await.unwrap().unwrap();

        // Also rejected while connected
        assert_eq!(
            controller.start_call().await,
            Err(SessionError::CallInProgress)
        );
        assert_eq!(credentials.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_end_call_returns_to_idle() {
        let (controller, media, _) = setup(StubCredentials::ok());
        controller.start_call().await.unwrap();

        controller.end_call().await;

        assert_eq!(controller.state(), SessionState::Idle { error: None });
        assert_eq!(media.disconnect_count(), 1);
        assert_eq!(controller.agent_state(), AgentState::default());
    }

    #[tokio::test]
    async fn test_end_call_when_idle_is_noop() {
        let (controller, media, _) = setup(StubCredentials::ok());

        controller.end_call().await;

        assert!(controller.state().is_idle());
        assert_eq!(media.disconnect_count(), 0);
    }

    #[tokio::test]
    async fn test_end_call_while_connecting_cancels() {
        let gate = Arc::new(Notify::new());
        let (controller, media, _) = setup(StubCredentials::gated(gate.clone()));

        let mut rx = controller.subscribe();
        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.start_call().await }
        });
        wait_for(&mut rx, SessionState::is_connecting).await;

        controller.end_call().await;
        gate.notify_one();

        assert_eq!(task.await.unwrap(), Err(SessionError::Cancelled));
        assert_eq!(controller.state(), SessionState::Idle { error: None });
        assert!(media.joins().await.is_empty());
    }

    async fn wait_for_joins(media: &MockMediaClient, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while media.joins().await.len() < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("join timed out");
    }

    #[tokio::test]
    async fn test_end_call_while_joining_disconnects_late_session() {
        let (controller, media, _) = setup(StubCredentials::ok());
        let join_gate = Arc::new(Notify::new());
        media.gate_next_join(join_gate.clone()).await;

        let task = tokio::spawn({
            let controller = controller.clone();
            async move { controller.start_call().await }
        });
        wait_for_joins(&media, 1).await;

        controller.end_call().await;
        join_gate.notify_one();

        assert_eq!(task.await.unwrap(), Err(SessionError::Cancelled));
        assert_eq!(controller.state(), SessionState::Idle { error: None });
        assert_eq!(media.disconnect_count(), 1);
        assert_eq!(media.live_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_stale_join_does_not_replace_newer_call() {
        let (controller, media, _) = setup(StubCredentials::ok());
        let join_gate = Arc::new(Notify::new());
        media.gate_next_join(join_gate.clone()).await;

        let mut rx = controller.subscribe();
        let stale = tokio::spawn({
            let controller = controller.clone();
            async move { controller.start_call().await }
        });
        wait_for_joins(&media, 1).await;

        // End the first call mid-join and start a second one that joins first
        controller.end_call().await;
        controller.start_call().await.unwrap();
        join_gate.notify_one();

        assert_eq!(stale.await.unwrap(), Err(SessionError::Cancelled));
        assert!(controller.state().is_connected());
        assert_eq!(media.joins().await.len(), 2);
        assert_eq!(media.live_sessions().await, 1);
        assert_eq!(media.disconnect_count(), 1);

        // The newer session is still the one being forwarded
        let mut agent_rx = controller.subscribe_agent_state();
        assert!(media.set_agent_state(AgentState::Listening).await);
        tokio::time::timeout(
            Duration::from_secs(2),
            agent_rx.wait_for(|s| *s == AgentState::Listening),
        )
        .await
        .unwrap()
        .unwrap();

        // And its end still returns the controller to idle
        media.drop_session().await;
        wait_for(&mut rx, SessionState::is_idle).await;
        assert_eq!(controller.state(), SessionState::Idle { error: None });
    }

    #[tokio::test]
    async fn test_stale_join_failure_keeps_newer_call() {
        let (controller, media, _) = setup(StubCredentials::ok());
        let join_gate = Arc::new(Notify::new());
        media.fail_next_join();
        media.gate_next_join(join_gate.clone()).await;

        let stale = tokio::spawn({
            let controller = controller.clone();
            async move { controller.start_call().await }
        });
        wait_for_joins(&media, 1).await;

        controller.end_call().await;
        controller.start_call().await.unwrap();
        join_gate.notify_one();

        assert!(matches!(stale.await.unwrap(), Err(SessionError::Media(_))));
        assert_eq!(controller.state(), SessionState::Connected(descriptor()));
    }

    #[tokio::test]
    async fn test_agent_state_is_forwarded() {
        let (controller, media, _) = setup(StubCredentials::ok());
        controller.start_call().await.unwrap();
        let mut agent_rx = controller.subscribe_agent_state();

        assert!(media.set_agent_state(AgentState::Speaking).await);

        tokio::time::timeout(
            Duration::from_secs(2),
            agent_rx.wait_for(|s| *s == AgentState::Speaking),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(controller.view().status, Some("Speaking..."));
    }

    #[tokio::test]
    async fn test_remote_disconnect_returns_to_idle() {
        let (controller, media, _) = setup(StubCredentials::ok());
        controller.start_call().await.unwrap();
        let mut rx = controller.subscribe();

        media.drop_session().await;

        wait_for(&mut rx, SessionState::is_idle).await;
        assert_eq!(controller.state(), SessionState::Idle { error: None });

        // Can start again afterwards
        controller.start_call().await.unwrap();
        assert!(controller.state().is_connected());
    }

    #[tokio::test]
    async fn test_join_failure_returns_to_idle_without_error() {
        let credentials = Arc::new(StubCredentials::ok());
        let media = Arc::new(MockMediaClient::failing());
        let controller = SessionController::new(credentials, media);

        let result = controller.start_call().await;

        assert!(matches!(result, Err(SessionError::Media(_))));
        assert_eq!(controller.state(), SessionState::Idle { error: None });
    }
}
