//! Chat room session
//!
//! A participant in the shared room. Joins the registry with a unique name
//! on open, fans chat out to every member, answers `@bot` queries through
//! the chatbot, and announces its departure on close.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::broadcast::broadcast;
use crate::connection::Connection;
use crate::error::AppError;
use crate::gateway::Chatbot;
use crate::message::{self, Input, CHATBOT_NAME};
use crate::registry::SessionRegistry;
use crate::types::{SessionId, SessionState};

/// Room participant state machine: `Created -> Open -> Closed`
pub struct RoomSession {
    id: SessionId,
    /// Requested name until open, resolved name afterwards
    name: String,
    /// True once the join sequence has completed
    initiated: bool,
    state: SessionState,
    connection: Connection,
    registry: Arc<SessionRegistry>,
    chatbot: Arc<dyn Chatbot>,
}

impl RoomSession {
    /// Create a session for `connection` that will ask for `requested_name` on open
    pub fn new(
        connection: Connection,
        requested_name: impl Into<String>,
        registry: Arc<SessionRegistry>,
        chatbot: Arc<dyn Chatbot>,
    ) -> Self {
        Self {
            id: connection.id,
            name: requested_name.into(),
            initiated: false,
            state: SessionState::Created,
            connection,
            registry,
            chatbot,
        }
    }

    /// Current display name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initiated(&self) -> bool {
        self.initiated
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Join the room
    ///
    /// Registers under a unique name, announces the join to every member
    /// (this session included) and sends a private welcome.
    pub async fn open(&mut self) -> Result<(), AppError> {
        self.expect_state(SessionState::Created)?;

        self.name = self
            .registry
            .add(self.id, &self.name, self.connection.clone())?;
        self.state = SessionState::Open;
        self.initiated = true;
        info!("Session {} joined the room as '{}'", self.id, self.name);

        broadcast(&self.registry, &message::joined_notice(&self.name));
        self.connection.send_text(message::welcome(&self.name)).await?;
        Ok(())
    }

    /// Handle one inbound text frame
    pub async fn handle_text(&mut self, text: &str) -> Result<(), AppError> {
        self.expect_state(SessionState::Open)?;

        match Input::classify(text) {
            Input::Blank => {}
            Input::Quit => {
                debug!("Session {} requested the shell", self.id);
                self.connection.redirect_to_shell();
            }
            Input::Bot(query) => {
                let reply = self.chatbot.get_response(query).await;
                broadcast(&self.registry, &message::chat_line(&self.name, text));
                broadcast(&self.registry, &message::chat_line(CHATBOT_NAME, &reply));
            }
            Input::Chat(line) => {
                broadcast(&self.registry, &message::chat_line(&self.name, line));
            }
        }
        Ok(())
    }

    /// Binary frames are not supported
    pub fn handle_binary(&self, _data: &[u8]) -> Result<(), AppError> {
        Err(AppError::BinaryNotSupported)
    }

    /// Change the display name
    ///
    /// Before open this only replaces the requested name. Once joined the new
    /// name is resolved against the other members, announced under the old
    /// name, and then taken into use.
    pub async fn rename(&mut self, requested: &str) -> Result<(), AppError> {
        match self.state {
            SessionState::Created => {
                self.name = requested.to_string();
                Ok(())
            }
            SessionState::Open => {
                let renamed = self.registry.rename(self.id, requested)?;
                if renamed.is_unchanged() {
                    return Ok(());
                }
                if self.initiated {
                    broadcast(
                        &self.registry,
                        &message::renamed_notice(&renamed.old, &renamed.new),
                    );
                }
                info!("Session {} renamed '{}' -> '{}'", self.id, renamed.old, renamed.new);
                self.name = renamed.new;
                Ok(())
            }
            SessionState::Closed => Err(AppError::InvalidState {
                expected: SessionState::Open,
                found: SessionState::Closed,
            }),
        }
    }

    /// Leave the room
    ///
    /// Safe to call more than once; only the first call after open has any
    /// effect.
    pub async fn close(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Closed);
        if previous != SessionState::Open {
            return;
        }

        let name = self
            .registry
            .remove(self.id)
            .unwrap_or_else(|| self.name.clone());
        info!("Session {} ('{}') left the room", self.id, name);
        broadcast(&self.registry, &message::left_notice(&name));
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), AppError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AppError::InvalidState {
                expected,
                found: self.state,
            })
        }
    }
}

impl Drop for RoomSession {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            warn!("Session {} dropped without closing, deregistering", self.id);
            self.registry.remove(self.id);
        }
    }
}
