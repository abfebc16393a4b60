#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use putry_server::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_tungstenite::tungstenite::Message;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub struct LiveServer {
    pub base: String,
    pub pool: sqlx::SqlitePool,
    pub provider: super::FakeProvider,
    pub state: Arc<AppState>,
}

/// Start the test app on a random TCP port.
pub async fn start_server() -> LiveServer {
    let pool = super::setup_test_db().await;
    let provider = super::FakeProvider::start().await;
    let state = super::create_test_state(pool.clone(), &provider);
    let app = super::create_test_app(state.clone());

    let base = super::serve(app).await;

    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    LiveServer {
        base,
        pool,
        provider,
        state,
    }
}

/// Open an unidentified gateway connection.
pub async fn ws_connect(base: &str) -> WsStream {
    let ws_url = format!("{}/gateway", base.replace("http://", "ws://"));
    let (ws, _) = tokio_tungstenite::connect_async(&ws_url).await.unwrap();
    ws
}

/// Connect and identify with `token`, consuming the `identified` ack.
pub async fn ws_identified(base: &str, token: &str) -> WsStream {
    let mut ws = ws_connect(base).await;
    send_json(&mut ws, &json!({"type": "identify-token", "token": token})).await;

    let ack = recv_json(&mut ws).await.expect("no identified ack");
    assert_eq!(ack["type"], "identified");
    ws
}

/// Read next text message parsed as JSON, with timeout.
pub async fn recv_json(ws: &mut WsStream) -> Option<Value> {
    let timeout = tokio::time::timeout(std::time::Duration::from_secs(3), ws.next()).await;
    match timeout {
        Ok(Some(Ok(Message::Text(text)))) => serde_json::from_str(&text).ok(),
        _ => None,
    }
}

/// Drain all pending messages until timeout.
pub async fn drain_messages(ws: &mut WsStream) -> Vec<Value> {
    let mut messages = Vec::new();
    loop {
        let timeout =
            tokio::time::timeout(std::time::Duration::from_millis(200), ws.next()).await;
        match timeout {
            Ok(Some(Ok(Message::Text(text)))) => {
                if let Ok(v) = serde_json::from_str::<Value>(&text) {
                    messages.push(v);
                }
            }
            _ => break,
        }
    }
    messages
}

/// Send a JSON message over WebSocket.
pub async fn send_json(ws: &mut WsStream, value: &Value) {
    ws.send(Message::Text(serde_json::to_string(value).unwrap().into()))
        .await
        .unwrap();
}

/// Poll until the registry holds `expected` sessions or a second passes.
pub async fn wait_for_sessions(state: &AppState, expected: usize) -> usize {
    for _ in 0..50 {
        let count = state.sessions.session_count().await;
        if count == expected {
            return count;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    state.sessions.session_count().await
}
