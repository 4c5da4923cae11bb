//! heyboo - Couple-Scoped Real-time Chat Backend
//!
//! A WebSocket fan-out server that groups connections into pairwise
//! "couple" scopes and delivers chat, typing and presence events to every
//! connection in a scope, plus an encrypted REST chat history.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types and configuration usable without the server
//!   - Real-time events and inbound frames
//!   - Persisted message and REST bodies
//!   - `AppConfig` and error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Connection registry, broadcast router and session lifecycle
//!   - AES-256-GCM content cipher and JWT identity context
//!   - REST chat and login handlers, auth middleware
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables `backend` and the `heyboo-server` binary
//!
//! # Usage
//!
//! ```text
//! JWT_SECRET=... ENCRYPTION_KEY=<64 hex chars> cargo run --bin heyboo-server
//! ```
//!
//! # Thread Safety
//!
//! The connection registry is the only structure mutated by many tasks; it
//! is guarded by a single `RwLock`. Events are immutable once published and
//! are shared between recipients as `Arc<Event>`.

pub mod shared;

#[cfg(feature = "ssr")]
pub mod backend;
