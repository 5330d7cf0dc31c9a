//! Error types for the session hub
//!
//! Defines application-level errors and message send errors.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::{SessionId, SessionState};

/// Application-level errors
///
/// Covers fatal transport errors and state-machine invariant violations.
/// Chatbot failures never show up here: the gateway degrades to a fallback reply.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,

    /// Session was added to the registry twice
    #[error("Session {0} is already registered")]
    AlreadyRegistered(SessionId),

    /// Session is not a registry member
    #[error("Session {0} is not registered")]
    NotRegistered(SessionId),

    /// Lifecycle operation called in the wrong state
    #[error("Invalid session state: expected {expected:?}, found {found:?}")]
    InvalidState {
        expected: SessionState,
        found: SessionState,
    },

    /// Binary frame delivered to a text-only session
    #[error("Binary input is not supported")]
    BinaryNotSupported,

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Message send errors
///
/// Occurs when attempting to send messages through closed channels.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The receiver is not keeping up; the message was dropped
    #[error("Channel full")]
    ChannelFull,
}

impl From<SendError> for AppError {
    fn from(_: SendError) -> Self {
        AppError::ChannelSend
    }
}
