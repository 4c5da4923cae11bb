/**
 * Application State Management
 *
 * `AppState` is the single state container handed to the axum router. Its
 * `FromRef` implementations let handlers extract only the part they use,
 * e.g. `State<ContentCipher>` or `State<Arc<dyn MessageStore>>`.
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and safe to share:
 * - the identity context and cipher are read-only after startup
 * - stores are trait objects behind `Arc`, synchronizing internally
 * - `SessionManager` wraps the lock-guarded registry and the router's
 *   publisher
 */
use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::identity::IdentityContext;
use crate::backend::auth::users::CredentialStore;
use crate::backend::chat::store::MessageStore;
use crate::backend::crypto::ContentCipher;
use crate::backend::realtime::SessionManager;
use crate::shared::AppConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Settings the server was started with
    pub config: Arc<AppConfig>,
    /// Token issue/verify
    pub identity: IdentityContext,
    /// At-rest encryption of message bodies
    pub cipher: ContentCipher,
    /// Persisted chat history
    pub messages: Arc<dyn MessageStore>,
    /// Password checks for `POST /login`
    pub credentials: Arc<dyn CredentialStore>,
    /// Real-time session lifecycle
    pub sessions: SessionManager,
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for IdentityContext {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for ContentCipher {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.cipher.clone()
    }
}

impl FromRef<AppState> for Arc<dyn MessageStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messages.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CredentialStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.credentials.clone()
    }
}

impl FromRef<AppState> for SessionManager {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
