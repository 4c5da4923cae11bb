//! Backend Error Module
//!
//! Errors returned by REST handlers and their conversion to HTTP
//! responses.
//!
//! - **`types`** - `BackendError`, status and category mapping
//! - **`conversion`** - `IntoResponse` producing the JSON error body
//!
//! Real-time errors live in `realtime::error`; they never become HTTP
//! responses once a connection is upgraded.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
