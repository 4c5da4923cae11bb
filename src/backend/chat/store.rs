/**
 * Message Persistence
 *
 * The storage collaborator consumed by the REST chat handlers. Two
 * implementations are provided:
 *
 * - `MemoryMessageStore` - process-local, lock-guarded; used when no
 *   database is configured and in tests
 * - `PgMessageStore` - PostgreSQL via sqlx
 *
 * Stores only ever see `PersistedMessage`, which carries ciphertext.
 */
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

use crate::shared::PersistedMessage;

/// Storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence operations for chat messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one message
    async fn save_message(&self, message: PersistedMessage) -> Result<(), StoreError>;

    /// Every message where `username` is sender or receiver, oldest first
    async fn messages_for_user(&self, username: &str) -> Result<Vec<PersistedMessage>, StoreError>;
}

/// In-memory message store
#[derive(Debug, Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<PersistedMessage>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored messages
    pub fn len(&self) -> usize {
        self.messages.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored record, in insertion order
    pub fn snapshot(&self) -> Vec<PersistedMessage> {
        self.messages.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Overwrite the ciphertext of the record at `index`
    ///
    /// Lets tests simulate at-rest corruption. Returns false if out of range.
    pub fn replace_ciphertext(&self, index: usize, ciphertext: String) -> bool {
        let mut messages = self.messages.write().unwrap_or_else(PoisonError::into_inner);
        match messages.get_mut(index) {
            Some(message) => {
                message.ciphertext = ciphertext;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn save_message(&self, message: PersistedMessage) -> Result<(), StoreError> {
        self.messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
        Ok(())
    }

    async fn messages_for_user(&self, username: &str) -> Result<Vec<PersistedMessage>, StoreError> {
        let mut found: Vec<PersistedMessage> = self
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|message| message.involves(username))
            .cloned()
            .collect();
        found.sort_by_key(|message| message.timestamp);
        Ok(found)
    }
}

/// PostgreSQL message store
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn save_message(&self, message: PersistedMessage) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, sender, receiver, ciphertext, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(uuid::Uuid::new_v4())
        .bind(&message.sender)
        .bind(&message.receiver)
        .bind(&message.ciphertext)
        .bind(message.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn messages_for_user(&self, username: &str) -> Result<Vec<PersistedMessage>, StoreError> {
        #[derive(sqlx::FromRow)]
        struct MessageRow {
            sender: String,
            receiver: String,
            ciphertext: String,
            timestamp: i64,
        }

        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT sender, receiver, ciphertext, timestamp
            FROM messages
            WHERE sender = $1 OR receiver = $1
            ORDER BY timestamp ASC, created_at ASC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PersistedMessage {
                sender: row.sender,
                receiver: row.receiver,
                ciphertext: row.ciphertext,
                timestamp: row.timestamp,
            })
            .collect())
    }
}
