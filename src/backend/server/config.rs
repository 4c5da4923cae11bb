/**
 * Server Configuration
 *
 * Loading of the optional PostgreSQL connection and selection of the
 * storage collaborators.
 *
 * # Error Handling
 *
 * Database problems are logged but do not prevent startup: without a
 * usable pool the server falls back to in-memory stores. The in-memory
 * credential store only knows the accounts listed in `SEED_USERS`.
 */
use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::auth::users::{
    CredentialError, CredentialStore, MemoryCredentialStore, PgCredentialStore,
};
use crate::backend::chat::store::{MemoryMessageStore, MessageStore, PgMessageStore};

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Message and credential stores the server runs with
#[derive(Clone)]
pub struct Stores {
    pub messages: Arc<dyn MessageStore>,
    pub credentials: Arc<dyn CredentialStore>,
}

impl Stores {
    /// Process-local stores
    pub fn in_memory() -> Self {
        Self {
            messages: Arc::new(MemoryMessageStore::new()),
            credentials: Arc::new(MemoryCredentialStore::new()),
        }
    }

    /// Stores backed by PostgreSQL
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            messages: Arc::new(PgMessageStore::new(pool.clone())),
            credentials: Arc::new(PgCredentialStore::new(pool)),
        }
    }

    /// Process-local stores with the given accounts
    pub fn in_memory_seeded(users: &[(String, String)]) -> Result<Self, CredentialError> {
        let credentials = MemoryCredentialStore::new();
        for (username, password) in users {
            credentials.add_user(username, password)?;
        }
        Ok(Self {
            messages: Arc::new(MemoryMessageStore::new()),
            credentials: Arc::new(credentials),
        })
    }

    /// PostgreSQL when a pool is available, memory otherwise
    ///
    /// `seed_users` only applies to the in-memory fallback; PostgreSQL
    /// accounts live in the `users` table.
    pub fn from_database(
        pool: DatabaseConfig,
        seed_users: &[(String, String)],
    ) -> Result<Self, CredentialError> {
        match pool {
            Some(pool) => {
                if !seed_users.is_empty() {
                    tracing::warn!("SEED_USERS ignored; accounts come from the users table");
                }
                Ok(Self::postgres(pool))
            }
            None if seed_users.is_empty() => {
                tracing::warn!(
                    "Using in-memory stores with no accounts; /login rejects everyone until SEED_USERS or DATABASE_URL is set"
                );
                Ok(Self::in_memory())
            }
            None => {
                tracing::warn!(
                    "Using in-memory stores with {} seeded account(s); history is lost on restart",
                    seed_users.len()
                );
                Self::in_memory_seeded(seed_users)
            }
        }
    }
}

/// Connect to PostgreSQL and run migrations
///
/// Returns `None` if no URL is configured or the connection fails.
pub async fn load_database(database_url: Option<&str>) -> DatabaseConfig {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");
    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };
    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
