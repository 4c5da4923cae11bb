/**
 * Persisted Message Types
 *
 * This module defines the storage-facing message record and the request and
 * response bodies of the REST chat endpoints.
 *
 * Persisted messages are addressed sender → receiver so that history can be
 * queried per user. They only ever hold ciphertext; plaintext exists solely
 * in `SendMessageRequest` (inbound) and `MessageView` (outbound).
 */
use serde::{Deserialize, Serialize};

/// Stored chat message
///
/// `ciphertext` is the hex-encoded blob produced by the content cipher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedMessage {
    /// Username of the author
    pub sender: String,
    /// Username of the addressee
    pub receiver: String,
    /// Encrypted content blob
    pub ciphertext: String,
    /// Unix seconds, assigned by the server
    pub timestamp: i64,
}

impl PersistedMessage {
    /// Whether `username` is a party to this message
    pub fn involves(&self, username: &str) -> bool {
        self.sender == username || self.receiver == username
    }
}

/// Body of `POST /auth/chat/send`
///
/// Older clients post the full message object including `sender` and
/// `timestamp`; both are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub receiver: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Decrypted message returned by `GET /auth/chat/receive`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub timestamp: i64,
}
