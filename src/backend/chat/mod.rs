//! Chat Backend Module
//!
//! Persistent, encrypted chat history behind the REST surface. This path is
//! independent of the real-time channel: messages sent here are stored, not
//! broadcast, and real-time events are never stored.
//!
//! # Architecture
//!
//! - **`store`** - `MessageStore` collaborator (memory or PostgreSQL)
//! - **`handlers`** - `POST /auth/chat/send`, `GET /auth/chat/receive`
//!
//! Message bodies are encrypted with `crypto::ContentCipher` before they
//! reach a store and decrypted only on the way out.

/// Message persistence
pub mod store;

/// REST chat handlers
pub mod handlers;

pub use handlers::{receive_messages, send_message};
pub use store::{MemoryMessageStore, MessageStore, PgMessageStore, StoreError};
