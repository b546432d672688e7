//! Client-side session lifecycle for Shams voice calls.
//!
//! The [`SessionController`] fetches connection details from the credential
//! issuer, hands them to a [`MediaClient`], and publishes session and agent
//! state over `tokio::sync::watch` channels. [`SessionView`] projects that
//! state into what the page renders.
//!
//! # Example
//!
//! ```rust,ignore
//! use session_controller::{HttpCredentialClient, SessionController};
//! use std::sync::Arc;
//!
//! let credentials = HttpCredentialClient::new("http://localhost:3000")?;
//! let controller = SessionController::new(Arc::new(credentials), media_client);
//!
//! controller.start_call().await?;
//! println!("{:?}", controller.view());
//!
//! controller.end_call().await;
//! ```

pub mod agent_state;
pub mod controller;
pub mod credentials;
pub mod errors;
pub mod media;
pub mod state;
pub mod view;

pub use agent_state::AgentState;
pub use controller::SessionController;
pub use credentials::{CredentialSource, HttpCredentialClient};
pub use errors::{CredentialError, MediaError, SessionError};
pub use media::{JoinOptions, MediaClient, MediaSession, MediaSessionId};
pub use state::SessionState;
pub use view::SessionView;
