//! JSON text-frame protocol and per-frame dispatch.
//!
//! The connection starts unauthenticated; the first accepted frame must
//! be an auth frame carrying the same JWT used for REST calls. The
//! realtime identity is whatever the verified token binds, never a
//! caller-supplied field. Malformed or out-of-state frames produce a
//! typed error frame; the connection stays open.

use axum::extract::ws::Message as WsMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use crate::store::models::{Message, NewMessage};
use crate::ws::{broadcast, ConnectionSender};

/// Close codes for auth failures, shared with the handshake tests.
pub const CLOSE_TOKEN_EXPIRED: u16 = 4001;
pub const CLOSE_TOKEN_INVALID: u16 = 4002;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// {"type":"auth","token":<JWT>}
    Auth { token: String },
    /// {"type":"chat_message","senderId":...,"receiverId":...,"content":...}
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// {"type":"auth","status":"success"}
    Auth { status: &'static str },
    NewMessage { message: Message },
    MessageSent { message: Message },
    Error { message: String },
}

impl ServerFrame {
    pub fn auth_success() -> Self {
        Self::Auth { status: "success" }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_ws_message(&self) -> WsMessage {
        // Serialization of these enums cannot fail
        let text = serde_json::to_string(self).unwrap_or_default();
        WsMessage::Text(text.into())
    }
}

/// What the actor should do with the connection after a frame.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    /// Close with this WebSocket close code.
    Close(u16),
}

fn send(tx: &ConnectionSender, frame: &ServerFrame) {
    let _ = tx.send(frame.to_ws_message());
}

/// Handle one inbound text frame. `authenticated` is the connection's
/// protocol state: None until a valid auth frame arrives. Each frame is
/// processed to completion (persist, forward, ack) before the actor
/// reads the next one, which is what gives per-pair ordering.
pub fn handle_text_frame(
    text: &str,
    tx: &ConnectionSender,
    state: &AppState,
    authenticated: &mut Option<Uuid>,
) -> FrameOutcome {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!(error = %e, "malformed realtime frame");
            send(tx, &ServerFrame::error("Malformed frame"));
            return FrameOutcome::Continue;
        }
    };

    match frame {
        ClientFrame::Auth { token } => handle_auth(&token, tx, state, authenticated),
        ClientFrame::ChatMessage {
            sender_id,
            receiver_id,
            content,
        } => handle_chat_message(sender_id, receiver_id, content, tx, state, authenticated),
    }
}

fn handle_auth(
    token: &str,
    tx: &ConnectionSender,
    state: &AppState,
    authenticated: &mut Option<Uuid>,
) -> FrameOutcome {
    let claims = match crate::auth::jwt::validate_token(&state.jwt_secret, token) {
        Ok(claims) => claims,
        Err(e) => {
            let code = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => CLOSE_TOKEN_EXPIRED,
                _ => CLOSE_TOKEN_INVALID,
            };
            tracing::warn!(close_code = code, "realtime auth failed");
            send(tx, &ServerFrame::error("Invalid token"));
            return FrameOutcome::Close(code);
        }
    };

    // Same re-resolution as REST: a token for a vanished user is dead.
    match state.store.get_user(claims.sub) {
        Ok(Some(_)) => {}
        _ => {
            send(tx, &ServerFrame::error("Invalid token"));
            return FrameOutcome::Close(CLOSE_TOKEN_INVALID);
        }
    }

    // Re-auth with a different identity moves the registration, so the
    // old user id never keeps a dead sender and pushes for the new one
    // reach this connection.
    match *authenticated {
        None => crate::ws::register(&state.connections, claims.sub, tx.clone()),
        Some(prev) if prev != claims.sub => {
            crate::ws::unregister(&state.connections, prev, tx);
            crate::ws::register(&state.connections, claims.sub, tx.clone());
        }
        Some(_) => {}
    }
    *authenticated = Some(claims.sub);
    tracing::info!(user_id = %claims.sub, "realtime connection authenticated");
    send(tx, &ServerFrame::auth_success());
    FrameOutcome::Continue
}

fn handle_chat_message(
    sender_id: Uuid,
    receiver_id: Uuid,
    content: String,
    tx: &ConnectionSender,
    state: &AppState,
    authenticated: &Option<Uuid>,
) -> FrameOutcome {
    let Some(user_id) = authenticated else {
        send(tx, &ServerFrame::error("Not authenticated"));
        return FrameOutcome::Continue;
    };
    // The wire format carries senderId for client symmetry, but the
    // authenticated identity is authoritative.
    if sender_id != *user_id {
        send(tx, &ServerFrame::error("Sender mismatch"));
        return FrameOutcome::Continue;
    }

    let message = match state.store.create_message(NewMessage {
        sender_id,
        receiver_id,
        content,
    }) {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(error = %e, "failed to persist realtime message");
            send(tx, &ServerFrame::error("Message not saved"));
            return FrameOutcome::Continue;
        }
    };

    // Forward to the receiver if online, then ack the sender
    // unconditionally with the persisted record.
    broadcast::send_to_user(
        &state.connections,
        receiver_id,
        &ServerFrame::NewMessage {
            message: message.clone(),
        },
    );
    send(tx, &ServerFrame::MessageSent { message });
    FrameOutcome::Continue
}
