/**
 * Server Initialization
 *
 * Builds the application state and router from an `AppConfig`.
 *
 * # Initialization Process
 *
 * 1. Validate the configuration
 * 2. Build the identity context (fails without a signing secret)
 * 3. Build the content cipher (fails on a malformed key; a missing key
 *    only fails individual encrypt/decrypt calls)
 * 4. Start the broadcast router task
 * 5. Load optional services (database) and pick stores, seeding the
 *    in-memory accounts when no database is available
 * 6. Create the router
 */
use axum::Router;
use std::sync::Arc;
use thiserror::Error;

use crate::backend::auth::identity::{IdentityContext, IdentityError};
use crate::backend::auth::users::CredentialError;
use crate::backend::crypto::{CipherError, ContentCipher};
use crate::backend::realtime::{BroadcastRouter, ConnectionRegistry, SessionManager};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, Stores};
use crate::backend::server::state::AppState;
use crate::shared::{AppConfig, ConfigError};

/// Startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("identity setup failed: {0}")]
    Identity(#[from] IdentityError),

    #[error("cipher setup failed: {0}")]
    Cipher(#[from] CipherError),

    #[error("seeding accounts failed: {0}")]
    Seed(#[from] CredentialError),
}

/// Build the shared state and spawn the broadcast router
///
/// Must run inside a tokio runtime. The router stops once every clone of
/// the returned state has been dropped.
pub fn build_state(config: AppConfig, stores: Stores) -> Result<AppState, InitError> {
    config.validate()?;

    let identity = IdentityContext::with_ttl(&config.jwt_secret, config.token_ttl)?;
    let cipher = ContentCipher::from_config(config.encryption_key.as_deref())?;
    if !cipher.is_configured() {
        tracing::warn!("ENCRYPTION_KEY not set; sending and reading chat history will fail");
    }

    let registry = ConnectionRegistry::new();
    let (publisher, _router_task) =
        BroadcastRouter::spawn(registry.clone(), config.delivery_timeout);
    let sessions = SessionManager::new(registry, publisher);

    Ok(AppState {
        config: Arc::new(config),
        identity,
        cipher,
        messages: stores.messages,
        credentials: stores.credentials,
        sessions,
    })
}

/// Create and configure the Axum application
pub async fn create_app(config: AppConfig) -> Result<Router<()>, InitError> {
    tracing::info!("Initializing heyboo backend server");
    config.validate()?;

    let db_pool = load_database(config.database_url.as_deref()).await;
    let stores = Stores::from_database(db_pool, &config.seed_users)?;
    let state = build_state(config, stores)?;

    tracing::info!("Router configured");
    Ok(create_router(state))
}
