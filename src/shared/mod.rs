//! Shared Module
//!
//! This module contains types that are shared between the server and its
//! clients: real-time frames, REST chat bodies, validation errors and the
//! application configuration. Nothing in here depends on the server stack.

/// Real-time event and frame types
pub mod event;

/// Persisted message and REST chat bodies
pub mod message;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use event::{Event, EventKind, InboundFrame, InboundKind};
pub use message::{MessageView, PersistedMessage, SendMessageRequest};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
