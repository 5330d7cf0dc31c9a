//! Basic type definitions for the session hub
//!
//! Provides newtype wrappers for type safety:
//! - `SessionId`: UUID-based unique session identifier
//! - `SessionKind`: which session variant a connection is running

use uuid::Uuid;

/// Unique session identifier (newtype pattern)
///
/// Wraps a UUID v4 for type-safe session identification.
/// Implements Hash and Eq for use as registry keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Shared broadcast room
    Room,
    /// One-to-one chatbot proxy
    Solo,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKind::Room => write!(f, "room"),
            SessionKind::Solo => write!(f, "chatbot"),
        }
    }
}

/// Lifecycle state shared by both session variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, transport handshake not yet completed
    Created,
    /// Accepting input
    Open,
    /// Terminal
    Closed,
}
