/**
 * Backend Error Types
 *
 * This module defines the errors REST handlers return. Every variant maps
 * to an HTTP status and one of a fixed set of categories, which clients
 * use to tell failure classes apart without parsing messages.
 *
 * # Categories
 *
 * | Category       | Status | Raised by                                      |
 * |----------------|--------|------------------------------------------------|
 * | `unauthorized` | 401    | missing/invalid token, bad credentials         |
 * | `bad_request`  | 400    | validation failures, malformed bodies          |
 * | `cipher`       | 500    | missing key, decryption or encryption failure  |
 * | `storage`      | 500    | message or credential store failures           |
 * | `internal`     | 500    | signing, hashing                               |
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::identity::IdentityError;
use crate::backend::auth::users::CredentialError;
use crate::backend::chat::store::StoreError;
use crate::backend::crypto::CipherError;
use crate::shared::SharedError;

/// Backend-specific error types
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Caller could not be authenticated
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Content cipher failure
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Message store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Credential check failure
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Token issue or verification failure
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Request validation failure
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Cipher(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Credential(err) => match err {
                CredentialError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                CredentialError::Hash(_) | CredentialError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Identity(err) => match err {
                IdentityError::InvalidToken(_) | IdentityError::EmptySubject => StatusCode::UNAUTHORIZED,
                IdentityError::MissingSecret
                | IdentityError::Signing(_)
                | IdentityError::LifetimeOutOfRange => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
        }
    }

    /// Stable category name for clients
    pub fn category(&self) -> &'static str {
        match self {
            Self::Cipher(_) => "cipher",
            Self::Store(_) | Self::Credential(CredentialError::Store(_)) => "storage",
            _ => match self.status_code() {
                StatusCode::UNAUTHORIZED => "unauthorized",
                status if status.is_client_error() => "bad_request",
                _ => "internal",
            },
        }
    }

    /// A human-readable error message
    ///
    /// Storage and internal failures get a generic message; their details
    /// are logged instead.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::Unauthorized { message } => message.clone(),
            Self::Cipher(err) => err.to_string(),
            Self::Store(_) | Self::Credential(CredentialError::Store(_)) => {
                "storage operation failed".to_string()
            }
            Self::Credential(CredentialError::InvalidCredentials) => {
                CredentialError::InvalidCredentials.to_string()
            }
            Self::Identity(IdentityError::InvalidToken(_) | IdentityError::EmptySubject) => {
                "invalid or expired token".to_string()
            }
            Self::SharedError(err) => err.to_string(),
            Self::Credential(_) | Self::Identity(_) => "internal server error".to_string(),
        }
    }
}
