/**
 * Router Configuration
 *
 * Combines every route group into one axum router and applies the
 * cross-cutting layers.
 *
 * # Layers
 *
 * - `TraceLayer` - one span per HTTP request
 * - `CorsLayer` - browser-extension origins (`chrome-extension://`,
 *   `moz-extension://`) are always allowed, plus any `ALLOWED_ORIGINS`
 */
use axum::http::{header, request::Parts, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

const EXTENSION_SCHEMES: [&str; 2] = ["chrome-extension://", "moz-extension://"];

/// Create the Axum router with all routes configured
///
/// | Method | Path                 | Auth            |
/// |--------|----------------------|-----------------|
/// | POST   | `/login`             | none            |
/// | GET    | `/ws`                | query or token  |
/// | POST   | `/auth/chat/send`    | bearer token    |
/// | GET    | `/auth/chat/receive` | bearer token    |
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new();
    let router = configure_api_routes(router);
    let router = configure_chat_routes(router, &app_state);

    router
        .fallback(|| async { (axum::http::StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(cors_layer(&app_state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Whether a request origin may make cross-origin calls
pub fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    EXTENSION_SCHEMES.iter().any(|scheme| origin.starts_with(scheme))
        || allowed.iter().any(|candidate| candidate == origin)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allowed: Arc<[String]> = config.allowed_origins.clone().into();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|origin| origin_allowed(origin, &allowed))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
