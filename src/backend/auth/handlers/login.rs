/**
 * Login Handler
 *
 * `POST /login` exchanges a username and password for an identity token.
 *
 * # Authentication Process
 *
 * 1. Validate that both fields are present
 * 2. Check the pair through the credential store (bcrypt)
 * 3. Issue a token for the canonical username
 *
 * Unknown users and wrong passwords both answer 401 with the same message.
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use std::sync::Arc;

use crate::backend::auth::handlers::types::{LoginRequest, TokenResponse};
use crate::backend::auth::identity::IdentityContext;
use crate::backend::auth::users::CredentialStore;
use crate::backend::error::BackendError;
use crate::shared::error::require_non_empty;

/// Login handler
///
/// # Example Request
///
/// ```http
/// POST /login HTTP/1.1
/// Content-Type: application/json
///
/// {"username": "alice", "password": "password123"}
/// ```
///
/// # Example Response
///
/// ```json
/// {"token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9..."}
/// ```
pub async fn login(
    State(credentials): State<Arc<dyn CredentialStore>>,
    State(identity): State<IdentityContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, BackendError> {
    let Json(request) = payload.map_err(|rejection| BackendError::bad_request(rejection.body_text()))?;
    require_non_empty("username", &request.username)?;
    require_non_empty("password", &request.password)?;

    tracing::info!("[Auth] Login request for: {}", request.username);
    let username = credentials
        .authenticate(&request.username, &request.password)
        .await
        .inspect_err(|err| tracing::warn!("[Auth] Login failed for {}: {}", request.username, err))?;

    let token = identity.issue(&username)?;
    tracing::info!("[Auth] User logged in successfully: {}", username);
    Ok(Json(TokenResponse { token }))
}
