//! Room-wide fan-out
//!
//! Sends one text message to every registry member. Membership is read once
//! per broadcast; the sends happen after the registry lock is released and
//! never wait on a member's outbound buffer.

use tracing::{debug, warn};

use crate::error::SendError;
use crate::registry::SessionRegistry;

/// Send `text` to every current member of `registry`
///
/// Best effort: members whose connection has gone away are skipped, and a
/// member whose outbound buffer is full misses this message. Returns the
/// number of members the message was delivered to.
pub fn broadcast(registry: &SessionRegistry, text: &str) -> usize {
    let mut delivered = 0;
    let mut recipients = 0;

    registry.for_each(|member| {
        recipients += 1;
        match member.connection.try_send_text(text) {
            Ok(()) => delivered += 1,
            Err(SendError::ChannelFull) => {
                warn!("Dropping broadcast to '{}': outbound buffer full", member.name)
            }
            Err(e) => debug!("Broadcast to '{}' skipped: {}", member.name, e),
        }
    });

    debug!("Broadcast delivered to {}/{} members", delivered, recipients);
    delivered
}
