//! Interactive text sessions
//!
//! A connection runs at most one session at a time. The two variants share
//! the lifecycle contract below and differ only in membership behavior:
//!
//! | | `open` | text | `close` |
//! |---|---|---|---|
//! | [`RoomSession`] | join registry, announce | chat / `@bot` / `quit` | leave registry, announce |
//! | [`SoloSession`] | greeting | proxy to chatbot / `quit` | nothing |
//!
//! Both are text-only.

pub mod room;
pub mod solo;

pub use room::RoomSession;
pub use solo::SoloSession;

use crate::error::AppError;
use crate::types::SessionKind;

/// A live session of either variant
pub enum Session {
    Room(RoomSession),
    Solo(SoloSession),
}

impl Session {
    /// Text frames are accepted by every variant
    pub const SUPPORTS_TEXT: bool = true;
    /// Binary frames are accepted by no variant
    pub const SUPPORTS_BINARY: bool = false;

    pub fn kind(&self) -> SessionKind {
        match self {
            Session::Room(_) => SessionKind::Room,
            Session::Solo(_) => SessionKind::Solo,
        }
    }

    pub fn supports_text(&self) -> bool {
        Self::SUPPORTS_TEXT
    }

    pub fn supports_binary(&self) -> bool {
        Self::SUPPORTS_BINARY
    }

    /// Called once the transport is ready
    pub async fn open(&mut self) -> Result<(), AppError> {
        match self {
            Session::Room(s) => s.open().await,
            Session::Solo(s) => s.open().await,
        }
    }

    /// Called once per inbound text frame, never concurrently
    pub async fn handle_text(&mut self, text: &str) -> Result<(), AppError> {
        match self {
            Session::Room(s) => s.handle_text(text).await,
            Session::Solo(s) => s.handle_text(text).await,
        }
    }

    /// Called for binary frames; always fails
    pub fn handle_binary(&self, data: &[u8]) -> Result<(), AppError> {
        match self {
            Session::Room(s) => s.handle_binary(data),
            Session::Solo(s) => s.handle_binary(data),
        }
    }

    /// Called once when the connection ends or the session is detached
    pub async fn close(&mut self) {
        match self {
            Session::Room(s) => s.close().await,
            Session::Solo(s) => s.close().await,
        }
    }
}

impl From<RoomSession> for Session {
    fn from(session: RoomSession) -> Self {
        Session::Room(session)
    }
}

impl From<SoloSession> for Session {
    fn from(session: SoloSession) -> Self {
        Session::Solo(session)
    }
}
