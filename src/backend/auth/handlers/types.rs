/**
 * Authentication Handler Types
 *
 * Request and response bodies of `POST /login`.
 */
use serde::{Deserialize, Serialize};

/// Login request
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    /// Checked against the stored bcrypt hash; never logged
    pub password: String,
}

/// Token response
#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    /// Signed identity token for the `Authorization: Bearer` header
    pub token: String,
}
