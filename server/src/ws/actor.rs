//! Actor-per-connection: one reader loop, one writer task, one ping
//! task per WebSocket.

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};
use uuid::Uuid;

use crate::state::AppState;
use crate::ws::protocol::{self, FrameOutcome};

/// Server sends a WebSocket ping every 30 seconds; prevents connection
/// leaks from abrupt disconnects.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// If no pong arrives within 10 seconds after a ping, close.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the connection until it closes.
///
/// Splits the WebSocket into reader and writer halves:
/// - Writer task: owns the sink, forwards frames from an mpsc channel
/// - Reader loop: processes incoming frames, dispatches to the protocol
///
/// The mpsc channel is what the registry hands out, so any part of the
/// system can push frames to this client by cloning the sender.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    // Protocol state: None until a valid auth frame arrives.
    let mut authenticated: Option<Uuid> = None;

    let writer_handle = tokio::spawn(writer_task(ws_sender, rx));

    // Track pong reception
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();

    let ping_tx = tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick
        ping_timer.tick().await;

        loop {
            ping_timer.tick().await;

            if ping_tx.send(Message::Ping(vec![1, 2, 3, 4].into())).is_err() {
                // Writer task has died; connection is gone
                break;
            }

            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {}
                _ => {
                    tracing::warn!("pong timeout, closing connection");
                    let _ = ping_tx.send(Message::Close(Some(CloseFrame {
                        code: 1001,
                        reason: "Pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    tracing::debug!("realtime connection opened");

    // Reader loop: each frame is processed to completion before the
    // next is read, so per-connection side effects happen in order.
    loop {
        match ws_receiver.next().await {
            Some(Ok(msg)) => match msg {
                Message::Text(text) => {
                    match protocol::handle_text_frame(&text, &tx, &state, &mut authenticated) {
                        FrameOutcome::Continue => {}
                        FrameOutcome::Close(code) => {
                            let _ = tx.send(Message::Close(Some(CloseFrame {
                                code,
                                reason: "Auth failed".into(),
                            })));
                            break;
                        }
                    }
                }
                Message::Binary(_) => {
                    // Protocol is JSON text frames only
                    let _ = tx.send(
                        protocol::ServerFrame::error("Expected text frame").to_ws_message(),
                    );
                }
                Message::Pong(_) => {
                    let _ = pong_tx.send(());
                }
                Message::Ping(data) => {
                    let _ = tx.send(Message::Pong(data));
                }
                Message::Close(frame) => {
                    tracing::debug!(reason = ?frame, "client initiated close");
                    break;
                }
            },
            Some(Err(e)) => {
                tracing::warn!(error = %e, "WebSocket receive error");
                break;
            }
            None => break,
        }
    }

    ping_handle.abort();

    // A connection that never authenticated was never registered.
    if let Some(user_id) = authenticated {
        crate::ws::unregister(&state.connections, user_id, &tx);
        tracing::info!(user_id = %user_id, "realtime connection closed");
    }

    // Dropping the last sender lets the writer drain whatever is still
    // queued, including a pending close frame, before it exits. An
    // abort here could cut the stream ahead of the close code.
    drop(tx);
    let _ = writer_handle.await;
}

/// Writer task: forwards mpsc frames to the WebSocket sink until either
/// side goes away.
async fn writer_task(
    mut ws_sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(msg) = rx.recv().await {
        if ws_sender.send(msg).await.is_err() {
            break;
        }
    }
}
