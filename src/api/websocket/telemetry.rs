//! Telemetry WebSocket handler
//!
//! Registers the viewer with the broadcast scheduler, forwards its outbox to
//! the socket, and answers `requestData` with the latest snapshot.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::WS_BUFFER_SIZE;
use crate::api::server::AppState;
use crate::broadcast::registry::{deliver, Outbox};
use crate::broadcast::BroadcastScheduler;
use crate::models::{ClientMessage, ConnectionId, Frame, ServerMessage};

/// WebSocket handler for the telemetry stream
pub async fn telemetry_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_telemetry_ws(socket, state.scheduler))
}

/// Handle one viewer session
async fn handle_telemetry_ws(socket: WebSocket, scheduler: Arc<BroadcastScheduler>) {
    let id = ConnectionId::new();
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Frame>(WS_BUFFER_SIZE);

    info!("Telemetry WebSocket {} connected", id);

    if let Err(e) = scheduler.join(id, tx.clone()) {
        error!("Failed to register viewer {}: {}", id, e);
        return;
    }

    // Forward queued frames to the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.to_string())).await.is_err() {
                break;
            }
        }
    });

    // Handle viewer requests and close
    let inbound = scheduler.clone();
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => handle_client_frame(&inbound, &id, &tx, &text),
                Ok(Message::Close(_)) => {
                    debug!("Telemetry WebSocket {} received close", id);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by axum
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Telemetry WebSocket {} error: {}", id, e);
                    break;
                }
            }
        }
    });

    // Wait for either side to finish
    tokio::select! {
        _ = &mut send_task => {}
        _ = &mut receive_task => {}
    }

    scheduler.leave(&id);
    send_task.abort();
    receive_task.abort();
    let _ = tokio::join!(send_task, receive_task);

    info!("Telemetry WebSocket {} disconnected", id);
}

/// Dispatch one text frame from a viewer
fn handle_client_frame(scheduler: &BroadcastScheduler, id: &ConnectionId, outbox: &Outbox, text: &str) {
    match ClientMessage::decode(text) {
        Ok(ClientMessage::RequestData) => {
            if let Err(e) = scheduler.resend(id) {
                warn!("Resend to {} failed: {}", id, e);
            }
        }
        Err(e) => {
            debug!("Rejecting frame from {}: {}", id, e);
            match ServerMessage::encode_error(e.to_string()) {
                Ok(frame) => {
                    deliver(id, outbox, frame);
                }
                Err(e) => error!("Failed to encode error frame: {}", e),
            }
        }
    }
}
