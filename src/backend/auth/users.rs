/**
 * Credential Verification
 *
 * The account collaborator consumed by the login handler. Registration and
 * password changes live outside this server; it only needs to check a
 * username/password pair against stored bcrypt hashes.
 */
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

use crate::backend::chat::store::StoreError;

/// Credential failures
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Unknown user or wrong password (deliberately indistinguishable)
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Stored hash could not be checked
    #[error("password verification failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    /// Backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for CredentialError {
    fn from(err: sqlx::Error) -> Self {
        Self::Store(StoreError::Database(err))
    }
}

/// Checks credentials and yields the canonical username
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, CredentialError>;
}

fn check_password(
    username: &str,
    password: &str,
    password_hash: Option<&str>,
) -> Result<String, CredentialError> {
    let password_hash = password_hash.ok_or(CredentialError::InvalidCredentials)?;
    if bcrypt::verify(password, password_hash)? {
        Ok(username.to_string())
    } else {
        Err(CredentialError::InvalidCredentials)
    }
}

/// In-memory credential store
#[derive(Debug)]
pub struct MemoryCredentialStore {
    hashes: RwLock<HashMap<String, String>>,
    cost: u32,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::with_cost(bcrypt::DEFAULT_COST)
    }
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a custom bcrypt cost (tests use the minimum)
    pub fn with_cost(cost: u32) -> Self {
        Self {
            hashes: RwLock::new(HashMap::new()),
            cost,
        }
    }

    /// Add or replace a user
    pub fn add_user(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let hash = bcrypt::hash(password, self.cost)?;
        self.hashes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_string(), hash);
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, CredentialError> {
        let hash = self
            .hashes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(username)
            .cloned();
        check_password(username, password, hash.as_deref())
    }
}

/// PostgreSQL credential store over the `users` table
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn authenticate(&self, username: &str, password: &str) -> Result<String, CredentialError> {
        let hash: Option<String> =
            sqlx::query_scalar("SELECT password_hash FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        check_password(username, password, hash.as_deref())
    }
}
