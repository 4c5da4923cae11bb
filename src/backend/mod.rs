//! Backend Module
//!
//! Server-side code, compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`realtime`** - WebSocket sessions, registry and broadcast router
//! - **`crypto`** - at-rest encryption of message bodies
//! - **`auth`** - identity tokens, credential checks, login
//! - **`chat`** - REST send/receive over the message store
//! - **`middleware`** - bearer-token gate
//! - **`routes`** - route table and layers
//! - **`server`** - state, store selection, startup
//! - **`error`** - `BackendError` and its HTTP rendering
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── main.rs        - heyboo-server binary
//! ├── realtime/      - registry, broadcast, lifecycle, socket
//! ├── crypto/        - content cipher
//! ├── auth/          - identity, users, handlers
//! ├── chat/          - store, handlers
//! ├── middleware/    - auth
//! ├── routes/        - router, api_routes, chat_routes
//! ├── server/        - state, config, init
//! └── error/         - types, conversion
//! ```

pub mod auth;
pub mod chat;
pub mod crypto;
pub mod error;
pub mod middleware;
pub mod realtime;
pub mod routes;
pub mod server;
