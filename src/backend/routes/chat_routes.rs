/**
 * Chat Routes
 *
 * ## Real-time
 * - `GET /ws` - WebSocket channel (identity per `realtime::socket`)
 *
 * ## REST (bearer token required)
 * - `POST /auth/chat/send` - encrypt and persist a message
 * - `GET /auth/chat/receive` - decrypted history of the caller
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::backend::chat::{receive_messages, send_message};
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::handle_socket_upgrade;
use crate::backend::server::state::AppState;

pub fn configure_chat_routes(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/chat/send", post(send_message))
        .route("/auth/chat/receive", get(receive_messages))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    router.route("/ws", get(handle_socket_upgrade)).merge(protected)
}
