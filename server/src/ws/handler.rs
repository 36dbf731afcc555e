//! WebSocket upgrade endpoint.
//!
//! The upgrade itself is unauthenticated; identity is established by
//! the first frame of the protocol (see `protocol`), which carries the
//! same JWT the REST surface verifies.

use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::state::AppState;
use crate::ws::actor;

/// GET /ws
pub async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| actor::run_connection(socket, state))
}
