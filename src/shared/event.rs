/**
 * Real-time Event Types
 *
 * This module defines the unit carried through the broadcast router and the
 * JSON frames exchanged over the real-time channel.
 *
 * # Frames
 *
 * Inbound (client → server):
 *
 * ```json
 * {"type": "chat_message", "content": "hi", "couple_id": "ignored", "sender": "ignored"}
 * ```
 *
 * Outbound (server → client):
 *
 * ```json
 * {"type": "chat_message", "sender": "alice", "content": "hi", "couple_id": "c1", "timestamp": 1700000000}
 * ```
 *
 * Only `chat_message` frames carry `content`; typing and presence frames
 * are sent with an empty string.
 *
 * # Immutability
 *
 * An `Event` is stamped with its sender, couple scope and timestamp when it is
 * constructed. Its fields are private and there are no setters, so an event
 * handed to the router can never be altered afterwards.
 */
use serde::{Deserialize, Serialize};

/// Kind of real-time event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Chat message between partners
    ChatMessage,
    /// Sender started typing
    TypingStart,
    /// Sender stopped typing
    TypingStop,
    /// Presence: a session joined the couple scope
    UserJoined,
    /// Presence: a session left the couple scope
    UserLeft,
}

impl EventKind {
    /// Only chat messages carry content; every other kind is sent with ""
    pub fn carries_content(self) -> bool {
        matches!(self, Self::ChatMessage)
    }
}

/// Kinds a client may send over the real-time channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    ChatMessage,
    TypingStart,
    TypingStop,
}

impl From<InboundKind> for EventKind {
    fn from(kind: InboundKind) -> Self {
        match kind {
            InboundKind::ChatMessage => Self::ChatMessage,
            InboundKind::TypingStart => Self::TypingStart,
            InboundKind::TypingStop => Self::TypingStop,
        }
    }
}

/// Frame received from a client
///
/// `couple_id`, `sender` and `timestamp` are accepted so that clients echoing
/// full frames still parse, but the server never trusts them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: InboundKind,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub couple_id: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl InboundFrame {
    /// Parse a raw payload into a frame
    pub fn parse(raw: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(raw)
    }
}

/// Scope-stamped real-time event, serialized as the outbound frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    #[serde(rename = "type")]
    kind: EventKind,
    sender: String,
    #[serde(default)]
    content: String,
    couple_id: String,
    timestamp: i64,
}

impl Event {
    /// Create an event stamped with the current server time
    pub fn new(
        kind: EventKind,
        sender: impl Into<String>,
        couple_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::at(kind, sender, couple_id, content, now_unix())
    }

    /// Create an event with an explicit timestamp (Unix seconds)
    pub fn at(
        kind: EventKind,
        sender: impl Into<String>,
        couple_id: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        let content = if kind.carries_content() {
            content.into()
        } else {
            String::new()
        };
        Self {
            kind,
            sender: sender.into(),
            content,
            couple_id: couple_id.into(),
            timestamp,
        }
    }

    /// Presence event announcing that `sender` joined `couple_id`
    pub fn joined(sender: impl Into<String>, couple_id: impl Into<String>) -> Self {
        Self::new(EventKind::UserJoined, sender, couple_id, "")
    }

    /// Presence event announcing that `sender` left `couple_id`
    pub fn left(sender: impl Into<String>, couple_id: impl Into<String>) -> Self {
        Self::new(EventKind::UserLeft, sender, couple_id, "")
    }

    /// Re-stamp a client frame with the session's identity and scope
    ///
    /// Any sender, scope or timestamp carried by the frame is discarded.
    pub fn from_inbound(frame: InboundFrame, sender: &str, couple_id: &str) -> Self {
        Self::new(frame.kind.into(), sender, couple_id, frame.content)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn couple_id(&self) -> &str {
        &self.couple_id
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Current time as Unix seconds
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
