/**
 * Public API Routes
 *
 * - `POST /login` - exchange credentials for an identity token
 */
use axum::{routing::post, Router};

use crate::backend::auth::login;
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/login", post(login))
}
