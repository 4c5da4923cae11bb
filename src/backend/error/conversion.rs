/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`, so handlers can return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "decryption failed: authentication failed",
 *   "category": "cipher",
 *   "status": 500
 * }
 * ```
 */
use axum::response::{IntoResponse, Json, Response};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Backend] {} ({})", self, self.category());
        } else {
            tracing::warn!("[Backend] {} ({})", self, self.category());
        }

        let body = serde_json::json!({
            "error": self.message(),
            "category": self.category(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
