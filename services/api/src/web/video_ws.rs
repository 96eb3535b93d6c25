//! services/api/src/web/video_ws.rs
//!
//! Streams the status of one video generation job over a WebSocket until the
//! vendor reports a terminal state or the client goes away.

use crate::web::{protocol::ServerMessage, state::AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use tutor_core::poller::JobStatusPoller;

/// GET /api/ai/video/{generation_id}/watch - Upgrade to a status stream.
pub async fn watch_video_handler(
    ws: WebSocketUpgrade,
    Path(generation_id): Path<String>,
    State(app_state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state, generation_id))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, generation_id: String) {
    info!(generation_id = %generation_id, "Video watch connection established.");

    let (mut sender, mut receiver) = socket.split();

    let mut poller = JobStatusPoller::new(app_state.video().clone())
        .with_interval(app_state.video_poll_interval);
    let mut updates = poller.subscribe();
    poller.start(generation_id.clone());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let message = ServerMessage::from_state(&updates.borrow_and_update());
                let Some(message) = message else { continue };

                if send_message(&mut sender, &message).await.is_err() {
                    info!(generation_id = %generation_id, "Client went away while sending.");
                    break;
                }
                if message.is_terminal() {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    info!(generation_id = %generation_id, "Client closed the watch connection.");
                    break;
                }
                Some(Err(e)) => {
                    warn!(generation_id = %generation_id, "WebSocket receive error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    // --- Cleanup ---
    poller.stop();
    info!(generation_id = %generation_id, "Video watch connection closed.");
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}
