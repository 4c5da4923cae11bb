/**
 * Send Handler
 *
 * `POST /auth/chat/send` encrypts a message body and persists it.
 *
 * The author is always the authenticated caller. Older clients also post
 * `sender` and `timestamp`; both are ignored, and the timestamp is assigned
 * here in Unix seconds.
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::chat::store::MessageStore;
use crate::backend::crypto::ContentCipher;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::error::require_non_empty;
use crate::shared::event::now_unix;
use crate::shared::{PersistedMessage, SendMessageRequest};

/// Acknowledgement body
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendMessageResponse {
    pub message: String,
}

pub async fn send_message(
    State(cipher): State<ContentCipher>,
    State(store): State<Arc<dyn MessageStore>>,
    AuthUser(user): AuthUser,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, BackendError> {
    let Json(request) = payload.map_err(|rejection| BackendError::bad_request(rejection.body_text()))?;
    require_non_empty("receiver", &request.receiver)?;
    require_non_empty("content", &request.content)?;

    if request.sender.as_deref().is_some_and(|sender| sender != user.username) {
        tracing::debug!(
            "[Chat] Ignoring client-supplied sender on message from {}",
            user.username
        );
    }

    let ciphertext = cipher.encrypt(&request.content)?;
    let message = PersistedMessage {
        sender: user.username,
        receiver: request.receiver,
        ciphertext,
        timestamp: now_unix(),
    };
    tracing::info!("[Chat] Storing message from {} to {}", message.sender, message.receiver);
    store.save_message(message).await?;

    Ok(Json(SendMessageResponse {
        message: "Message sent successfully".to_string(),
    }))
}
