//! HTTP handlers for authentication endpoints

pub mod login;
pub mod types;

pub use login::login;
pub use types::{LoginRequest, TokenResponse};
