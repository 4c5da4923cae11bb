/**
 * Authentication Middleware
 *
 * Gates the REST chat routes: the bearer token in the `Authorization`
 * header is verified by the identity context and the resulting username is
 * attached to the request for handlers to extract with `AuthUser`.
 */
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::identity::IdentityContext;
use crate::backend::error::BackendError;

/// Caller identity established by `auth_middleware`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Authentication middleware
///
/// Returns 401 (`unauthorized`) if the header is missing, is not a bearer
/// token, or the token fails verification.
pub async fn auth_middleware(
    State(identity): State<IdentityContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok()))?;
    let username = identity.verify(token)?;

    request.extensions_mut().insert(AuthenticatedUser { username });
    Ok(next.run(request).await)
}

/// Pull the token out of an `Authorization` header value
fn bearer_token(header: Option<&str>) -> Result<&str, BackendError> {
    let header = header.ok_or_else(|| BackendError::unauthorized("missing Authorization header"))?;
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| BackendError::unauthorized("invalid Authorization header format"))
}

/// Axum extractor for the authenticated user
///
/// Only meaningful on routes behind `auth_middleware`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<AuthenticatedUser>().cloned().ok_or_else(|| {
            tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
            BackendError::unauthorized("not authenticated")
        })?;
        Ok(AuthUser(user))
    }
}
