//! REST endpoints for chat: conversation summaries, per-counterpart
//! history (with the read side effect), and message send.
//!
//! The REST send path and the realtime chat frame are both complete
//! single-write paths: each persists exactly once and pushes the new
//! message to the receiver's live connections. A client performs one
//! logical send through exactly one of them.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::middleware::{current_user, Claims};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{ChatSummary, Message, NewMessage};
use crate::ws::{broadcast, protocol::ServerFrame};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub content: String,
}

/// GET /api/chat/conversations — aggregator output for the caller.
pub async fn conversations(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let user = current_user(&state, &claims)?;
    Ok(Json(state.store.chat_list_for_user(user.id)?))
}

/// GET /api/chat/messages/{userId} — full history with that
/// counterpart. Side effect: everything they sent the caller is marked
/// read, so the next aggregation reports zero unread for them.
pub async fn history(
    State(state): State<AppState>,
    claims: Claims,
    Path(counterpart_id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let user = current_user(&state, &claims)?;
    let messages = state.store.messages_between(user.id, counterpart_id)?;
    state.store.mark_messages_read(counterpart_id, user.id)?;
    Ok(Json(messages))
}

/// POST /api/chat/messages — persist a message from the caller and push
/// it to the receiver's live connections, if any.
pub async fn send_message(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let user = current_user(&state, &claims)?;
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("Invalid request data"));
    }

    let message = state.store.create_message(NewMessage {
        sender_id: user.id,
        receiver_id: body.receiver_id,
        content: body.content,
    })?;

    broadcast::send_to_user(
        &state.connections,
        message.receiver_id,
        &ServerFrame::NewMessage {
            message: message.clone(),
        },
    );

    Ok(Json(message))
}
