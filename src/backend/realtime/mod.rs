//! Real-time Messaging Module
//!
//! Couple-scoped fan-out of chat, typing and presence events over
//! WebSocket connections.
//!
//! # Architecture
//!
//! - **`registry`** - open sessions indexed by couple scope
//! - **`broadcast`** - the single-consumer router and its publisher
//! - **`lifecycle`** - join/leave orchestration around each read loop
//! - **`socket`** - the axum WebSocket endpoint
//! - **`error`** - per-connection error taxonomy
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs        - Module exports and documentation
//! ├── registry.rs   - ConnectionRegistry, Session, ConnectionHandle
//! ├── broadcast.rs  - BroadcastRouter, EventPublisher
//! ├── lifecycle.rs  - SessionManager
//! ├── socket.rs     - GET /ws handler
//! └── error.rs      - RealtimeError
//! ```
//!
//! # Event Flow
//!
//! ```text
//! socket reader --> SessionManager --> EventPublisher --> BroadcastRouter
//!                                                             |
//!            socket writer <-- outbound queue <-- Session <---+ (per scope)
//! ```
//!
//! The content cipher and identity context are not involved past the
//! handshake; events travel through the router in plaintext.

pub mod broadcast;
pub mod error;
pub mod lifecycle;
pub mod registry;
pub mod socket;

pub use broadcast::{BroadcastRouter, EventPublisher};
pub use error::RealtimeError;
pub use lifecycle::SessionManager;
pub use registry::{ConnectionHandle, ConnectionId, ConnectionRegistry, Session};
pub use socket::handle_socket_upgrade;
