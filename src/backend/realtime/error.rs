/**
 * Real-time Error Types
 *
 * Every variant here is local to a single connection: none of them stops the
 * router or affects other sessions. Real-time clients never see these as
 * structured frames; they observe a closed connection.
 */
use thiserror::Error;

use crate::backend::realtime::registry::ConnectionId;

#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Handshake lacked identity or couple scope
    #[error("connection rejected: {reason}")]
    ConnectionRejected {
        /// Which precondition failed
        reason: &'static str,
    },

    /// Inbound frame failed to parse
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// Write to one peer failed
    #[error("delivery to connection {connection} failed: {reason}")]
    DeliveryFailure {
        connection: ConnectionId,
        reason: &'static str,
    },

    /// Handle registered twice (allocation bug)
    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    /// Session no longer registered
    #[error("connection {0} is closed")]
    SessionClosed(ConnectionId),

    /// Router has shut down
    #[error("event pipeline is closed")]
    PipelineClosed,
}

impl RealtimeError {
    pub fn rejected(reason: &'static str) -> Self {
        Self::ConnectionRejected { reason }
    }
}
