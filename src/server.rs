//! Session hub
//!
//! Process-wide shared state, constructed once and cloned into every
//! connection task: the single room registry and the chatbot settings.
//! Builds sessions for routes picked by the shell.

use std::sync::Arc;

use tracing::debug;

use crate::config::ChatbotConfig;
use crate::connection::Connection;
use crate::error::AppError;
use crate::gateway::{Chatbot, GatewaySettings};
use crate::registry::SessionRegistry;
use crate::session::{RoomSession, Session, SoloSession};
use crate::shell::Route;

/// Produces a chatbot for each new session
pub type ChatbotFactory = Arc<dyn Fn() -> Arc<dyn Chatbot> + Send + Sync>;

/// Shared hub state
#[derive(Clone)]
pub struct ChatHub {
    registry: Arc<SessionRegistry>,
    chatbots: ChatbotFactory,
}

impl ChatHub {
    /// Create a hub backed by the external chatbot service
    pub fn new(config: ChatbotConfig) -> Result<Self, AppError> {
        let settings = GatewaySettings::new(config)?;
        Ok(Self::with_chatbots(Arc::new(move || {
            Arc::new(settings.gateway()) as Arc<dyn Chatbot>
        })))
    }

    /// Create a hub with a custom chatbot source
    pub fn with_chatbots(chatbots: ChatbotFactory) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
            chatbots,
        }
    }

    /// The room membership registry
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Build the session for `route`, or `None` for the shell
    pub fn session_for(&self, route: &Route, connection: Connection) -> Option<Session> {
        match route {
            Route::Shell => None,
            Route::Room { name } => {
                debug!("Creating room session {} (requested '{}')", connection.id, name);
                Some(self.room_session(connection, name.clone()).into())
            }
            Route::Chatbot => {
                debug!("Creating chatbot session {}", connection.id);
                Some(self.solo_session(connection).into())
            }
        }
    }

    /// Create a room session sharing this hub's registry
    pub fn room_session(&self, connection: Connection, requested_name: String) -> RoomSession {
        RoomSession::new(
            connection,
            requested_name,
            Arc::clone(&self.registry),
            (self.chatbots)(),
        )
    }

    /// Create a one-to-one chatbot session
    pub fn solo_session(&self, connection: Connection) -> SoloSession {
        SoloSession::new(connection, (self.chatbots)())
    }
}
