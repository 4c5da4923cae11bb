/**
 * Receive Handler
 *
 * `GET /auth/chat/receive` returns the caller's history, decrypted.
 *
 * History covers every message the caller sent or received, oldest first.
 * Decryption is all-or-nothing: one blob that fails to open fails the whole
 * request with a `cipher` error. Ciphertext or empty bodies are never
 * returned in place of content.
 */
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::chat::store::MessageStore;
use crate::backend::crypto::{CipherError, ContentCipher};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::{MessageView, PersistedMessage};

/// History body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageHistory {
    pub messages: Vec<MessageView>,
}

pub async fn receive_messages(
    State(cipher): State<ContentCipher>,
    State(store): State<Arc<dyn MessageStore>>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageHistory>, BackendError> {
    let mut persisted = store.messages_for_user(&user.username).await?;
    persisted.sort_by_key(|message| message.timestamp);

    let messages = decrypt_all(&cipher, persisted).inspect_err(|err| {
        tracing::error!("[Chat] Could not open history for {}: {}", user.username, err);
    })?;

    tracing::debug!("[Chat] Returning {} message(s) to {}", messages.len(), user.username);
    Ok(Json(MessageHistory { messages }))
}

/// Decrypt every message or none
pub fn decrypt_all(
    cipher: &ContentCipher,
    persisted: Vec<PersistedMessage>,
) -> Result<Vec<MessageView>, CipherError> {
    persisted
        .into_iter()
        .map(|message| {
            let content = cipher.decrypt(&message.ciphertext)?;
            Ok(MessageView {
                sender: message.sender,
                receiver: message.receiver,
                content,
                timestamp: message.timestamp,
            })
        })
        .collect()
}
