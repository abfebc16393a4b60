mod chat;
mod lifecycle;

use axum::{
    extract::{State, WebSocketUpgrade, ws::{Message, WebSocket}},
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::AppState;
use crate::ws::events::ClientEvent;
use crate::ws::gateway::ConnectionId;

/// WebSocket upgrade handler. Connections start unidentified; the client
/// proves who it is later with an `identify-token` event.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = state.sessions.next_connection_id().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.sessions.connect(conn_id, tx).await;
    tracing::debug!("Connection {} opened", conn_id);

    // Task to forward messages from mpsc to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_tx.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive loop
    let state_clone = state.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    let text_str: &str = &text;
                    match serde_json::from_str::<ClientEvent>(text_str) {
                        Ok(event) => handle_client_event(&state_clone, conn_id, event).await,
                        Err(e) => tracing::debug!("Ignoring malformed frame on {}: {}", conn_id, e),
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }

    lifecycle::handle_disconnect(&state, conn_id).await;
}

async fn handle_client_event(state: &AppState, conn_id: ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::IdentifyToken { token } => {
            lifecycle::handle_identify(state, conn_id, &token).await;
        }
        ClientEvent::SendMessage { from, to, body } => {
            chat::handle_send_message(state, conn_id, from, to, body).await;
        }
        ClientEvent::Ping => {}
    }
}
