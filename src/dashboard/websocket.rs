use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use super::state::DashboardState;
use crate::session::ChatSession;

/// Axum handler that upgrades an HTTP request to a WebSocket connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<DashboardState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Initial frame sent to every client: the session id and the conversation
/// so far, so a late joiner starts from the same history the page shows.
fn session_snapshot(session: &ChatSession) -> String {
    serde_json::json!({
        "type": "session_snapshot",
        "session_id": session.id().as_str(),
        "messages": session.log().all(),
    })
    .to_string()
}

/// Manages a single WebSocket connection: greets the client with the current
/// session snapshot, then forwards `ChatEvent`s as JSON as turns happen.
async fn handle_socket(socket: WebSocket, state: Arc<DashboardState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before snapshotting so no event between the two is missed.
    let mut event_rx = state.event_tx.subscribe();
    let snapshot = {
        let session = state.session.read().await;
        session_snapshot(&session)
    };
    if sender.send(Message::Text(snapshot)).await.is_err() {
        return; // client already gone
    }

    // Task: forward broadcast events → WebSocket client
    let mut send_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break; // client disconnected
                    }
                }
                // A slow client missed some events; newer ones still matter.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Task: read from WebSocket (handle close / ping-pong)
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    // Wait for either task to finish, then abort the other to prevent leaks
    tokio::select! {
        _ = &mut send_task => { recv_task.abort(); },
        _ = &mut recv_task => { send_task.abort(); },
    }
}
