//! Connection handle
//!
//! The outbound side of a client connection as seen by sessions: a text
//! channel drained by the connection's write task, plus the shell-redirect
//! signal consumed by the connection loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::SendError;
use crate::types::SessionId;

/// Handle to a connected client
///
/// Cheap to clone. The registry keeps clones for broadcasting; dropping
/// them never closes the underlying socket.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Identity of the session running on this connection
    pub id: SessionId,
    /// Hub → client text channel
    sender: mpsc::Sender<String>,
    /// Set when the active session asks to return to the root shell
    redirect: Arc<AtomicBool>,
}

impl Connection {
    /// Create a new connection handle with the given ID and sender channel
    pub fn new(id: SessionId, sender: mpsc::Sender<String>) -> Self {
        Self {
            id,
            sender,
            redirect: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send a text frame to this client
    ///
    /// Returns an error if the channel is closed (client disconnected).
    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.sender
            .send(text.into())
            .await
            .map_err(|_| SendError::ChannelClosed)
    }

    /// Send a text frame without waiting for buffer space
    ///
    /// Used for room-wide fan-out, where one slow reader must not hold up
    /// the sender. A full buffer drops the frame.
    pub fn try_send_text(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.sender.try_send(text.into()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SendError::ChannelFull,
            mpsc::error::TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }

    /// Ask the connection loop to detach the active session and go back to the shell
    pub fn redirect_to_shell(&self) {
        self.redirect.store(true, Ordering::Release);
    }

    /// Consume a pending shell redirect
    pub fn take_redirect(&self) -> bool {
        self.redirect.swap(false, Ordering::AcqRel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_text() {
        let (tx, mut rx) = mpsc::channel(32);
        let conn = Connection::new(SessionId::new(), tx);

        conn.send_text("hello").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_send_after_disconnect() {
        let (tx, rx) = mpsc::channel(32);
        let conn = Connection::new(SessionId::new(), tx);
        drop(rx);

        assert!(matches!(
            conn.send_text("hello").await,
            Err(SendError::ChannelClosed)
        ));
        assert!(matches!(
            conn.try_send_text("hello"),
            Err(SendError::ChannelClosed)
        ));
    }

    #[test]
    fn test_try_send_does_not_wait_on_full_buffer() {
        let (tx, mut rx) = mpsc::channel(1);
        let conn = Connection::new(SessionId::new(), tx);

        conn.try_send_text("first").unwrap();
        assert!(matches!(
            conn.try_send_text("second"),
            Err(SendError::ChannelFull)
        ));
        assert_eq!(rx.try_recv().unwrap(), "first");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_redirect_is_consumed_once() {
        let (tx, _rx) = mpsc::channel(32);
        let conn = Connection::new(SessionId::new(), tx);
        let clone = conn.clone();

        assert!(!conn.take_redirect());
        clone.redirect_to_shell();
        assert!(conn.take_redirect());
        assert!(!conn.take_redirect());
    }
}
