//! Crypto Module
//!
//! At-rest protection for persisted chat content. Only the REST chat
//! handlers call into this module; the real-time path never touches it.

/// AES-256-GCM content cipher
pub mod cipher;

pub use cipher::{CipherError, ContentCipher};
