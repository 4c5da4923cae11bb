//! Authentication Module
//!
//! Identity tokens, credential checks and the login endpoint.
//!
//! # Architecture
//!
//! - **`identity`** - `IdentityContext`: issues and verifies HS256 tokens
//! - **`users`** - `CredentialStore`: bcrypt password checks (memory or PostgreSQL)
//! - **`handlers`** - `POST /login`
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── identity.rs     - Token issue/verify
//! ├── users.rs        - Credential stores
//! └── handlers/
//!     ├── mod.rs      - Handler exports
//!     ├── types.rs    - Request/response types
//!     └── login.rs    - Login handler
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Login**: username and password → credentials verified → token returned
//! 2. **REST calls**: `Authorization: Bearer <token>` → `middleware::auth` verifies
//!    it and exposes the username to handlers
//! 3. **Real-time**: optionally, `?token=` on `/ws` (see `realtime::socket`)
//!
//! Registration and password changes are handled elsewhere; the server only
//! reads the `users` table.

/// Token issue and verification
pub mod identity;

/// Credential stores
pub mod users;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use handlers::login;
pub use identity::{Claims, IdentityContext, IdentityError};
pub use users::{CredentialError, CredentialStore, MemoryCredentialStore, PgCredentialStore};
