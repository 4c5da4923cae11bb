/**
 * Identity Context
 *
 * This module issues and verifies the signed identity tokens that gate the
 * REST surface (and, when enabled, real-time connection setup).
 *
 * Tokens are HS256 JWTs carrying the caller's username and an expiry. The
 * signing secret is read once at startup; a missing secret is a startup
 * failure rather than a fallback to a default key.
 */
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::shared::config::DEFAULT_TOKEN_TTL;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Stable username of the caller
    pub username: String,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Identity failures
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Token is malformed, mis-signed or expired
    #[error("invalid or expired token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    /// Token verified but names nobody
    #[error("token carries no username")]
    EmptySubject,

    /// No signing secret configured
    #[error("token signing secret is not configured")]
    MissingSecret,

    /// Signing failed
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    /// Expiry does not fit in a Unix timestamp
    #[error("token lifetime out of range")]
    LifetimeOutOfRange,
}

/// Issues and verifies identity tokens
#[derive(Clone)]
pub struct IdentityContext {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for IdentityContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityContext").field("ttl", &self.ttl).finish()
    }
}

impl IdentityContext {
    /// Create a context with the default 24 hour token lifetime
    pub fn new(secret: &str) -> Result<Self, IdentityError> {
        Self::with_ttl(secret, DEFAULT_TOKEN_TTL)
    }

    /// Create a context with a custom token lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Result<Self, IdentityError> {
        if secret.trim().is_empty() {
            return Err(IdentityError::MissingSecret);
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `username`
    pub fn issue(&self, username: &str) -> Result<String, IdentityError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let exp = now
            .checked_add(self.ttl.as_secs())
            .ok_or(IdentityError::LifetimeOutOfRange)?;
        let claims = Claims {
            username: username.to_string(),
            iat: now,
            exp,
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, IdentityError> {
        encode(&Header::default(), claims, &self.encoding).map_err(IdentityError::Signing)
    }

    /// Verify a token and return the username it was issued for
    ///
    /// Expiry is checked without leeway.
    pub fn verify(&self, token: &str) -> Result<String, IdentityError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(IdentityError::InvalidToken)?;
        if data.claims.username.is_empty() {
            return Err(IdentityError::EmptySubject);
        }
        Ok(data.claims.username)
    }
}
