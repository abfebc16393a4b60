use super::{ConnectionId, SessionRegistry};
use crate::ws::events::ServerEvent;

impl SessionRegistry {
    /// Send to every open connection, identified or not.
    pub async fn broadcast_all(&self, event: &ServerEvent) {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return,
        };

        let connections = self.connections.read().await;
        for conn in connections.values() {
            let _ = conn.tx.send(msg.clone());
        }
    }

    pub async fn send_to(&self, conn_id: ConnectionId, event: &ServerEvent) -> bool {
        let msg = match serde_json::to_string(event) {
            Ok(m) => m,
            Err(_) => return false,
        };

        let connections = self.connections.read().await;
        match connections.get(&conn_id) {
            Some(conn) => conn.tx.send(msg).is_ok(),
            None => false,
        }
    }

    /// Deliver to the user's live session, if any. Returns whether a
    /// connection accepted the event.
    pub async fn send_to_user(&self, user_id: i64, event: &ServerEvent) -> bool {
        let conn_id = {
            let connections = self.connections.read().await;
            let sessions = self.sessions.read().await;
            match sessions.get(&user_id) {
                Some(id) if connections.contains_key(id) => *id,
                _ => return false,
            }
        };
        self.send_to(conn_id, event).await
    }
}
