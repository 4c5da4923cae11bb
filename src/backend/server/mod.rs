//! Server Module
//!
//! Startup wiring for the axum server.
//!
//! - **`state`** - `AppState` and its `FromRef` implementations
//! - **`config`** - database loading and store selection
//! - **`init`** - state construction and app creation
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: `AppConfig` is validated; a missing signing secret
//!    or malformed cipher key aborts startup
//! 2. **Router task**: the broadcast router is spawned
//! 3. **Stores**: PostgreSQL if `DATABASE_URL` connects, memory otherwise
//! 4. **Routes**: see `routes::router`

/// Application state management
pub mod state;

/// Database loading and store selection
pub mod config;

/// Server initialization
pub mod init;

pub use config::Stores;
pub use init::{build_state, create_app, InitError};
pub use state::AppState;
