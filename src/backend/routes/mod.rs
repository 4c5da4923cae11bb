//! Routes Module
//!
//! HTTP route configuration.
//!
//! - **`router`** - top-level router, CORS and tracing layers
//! - **`api_routes`** - public endpoints (`/login`)
//! - **`chat_routes`** - `/ws` and the token-gated `/auth/chat/*` routes

pub mod api_routes;
pub mod chat_routes;
pub mod router;

pub use router::create_router;
