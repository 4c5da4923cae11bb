//! Middleware Module
//!
//! HTTP middleware applied in `routes::router`.
//!
//! - **`auth`** - bearer-token gate for the REST chat routes

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
