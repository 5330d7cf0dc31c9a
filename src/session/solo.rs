//! One-to-one chatbot session
//!
//! Proxies every message to the chatbot and sends the reply back. No
//! registry membership and nothing to clean up on close.

use std::sync::Arc;

use tracing::debug;

use crate::connection::Connection;
use crate::error::AppError;
use crate::gateway::Chatbot;
use crate::message::{Input, QUIT_COMMAND};
use crate::types::{SessionId, SessionState};

/// Greeting sent when the session opens
pub const GREETING: &str = "Hi, I'm a chatbot! Type a question and I'll do my best to answer it. \
     Type \"quit\" to return to the shell.";

/// Chatbot proxy state machine: `Created -> Open -> Closed`
pub struct SoloSession {
    id: SessionId,
    state: SessionState,
    connection: Connection,
    chatbot: Arc<dyn Chatbot>,
}

impl SoloSession {
    pub fn new(connection: Connection, chatbot: Arc<dyn Chatbot>) -> Self {
        Self {
            id: connection.id,
            state: SessionState::Created,
            connection,
            chatbot,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Send the greeting
    pub async fn open(&mut self) -> Result<(), AppError> {
        if self.state != SessionState::Created {
            return Err(AppError::InvalidState {
                expected: SessionState::Created,
                found: self.state,
            });
        }
        self.state = SessionState::Open;
        self.connection.send_text(GREETING).await?;
        Ok(())
    }

    /// Forward one message to the chatbot and relay its reply
    pub async fn handle_text(&mut self, text: &str) -> Result<(), AppError> {
        if self.state != SessionState::Open {
            return Err(AppError::InvalidState {
                expected: SessionState::Open,
                found: self.state,
            });
        }

        if matches!(Input::classify(text), Input::Quit) {
            debug!("Session {} typed '{}', returning to shell", self.id, QUIT_COMMAND);
            self.connection.redirect_to_shell();
            return Ok(());
        }

        let reply = self.chatbot.get_response(text).await;
        self.connection.send_text(reply).await?;
        Ok(())
    }

    /// Binary frames are not supported
    pub fn handle_binary(&self, _data: &[u8]) -> Result<(), AppError> {
        Err(AppError::BinaryNotSupported)
    }

    pub async fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}
