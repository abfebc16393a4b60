mod server_event;

pub use server_event::ServerEvent;

use serde::Deserialize;

// ── Client → Server Events ──

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "identify-token")]
    IdentifyToken { token: String },
    #[serde(rename = "send_message")]
    SendMessage {
        #[serde(default)]
        from: Option<i64>,
        to: i64,
        body: String,
    },
    #[serde(rename = "ping")]
    Ping,
}
