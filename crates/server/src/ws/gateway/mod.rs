mod broadcast;

use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};

pub type ConnectionId = u64;

pub struct Connection {
    pub tx: mpsc::UnboundedSender<String>,
    /// Set once the connection has presented a verified token.
    pub user_id: Option<i64>,
}

/// Live realtime connections and the user → connection routing table.
///
/// Lock order is always `connections` then `sessions`.
pub struct SessionRegistry {
    next_id: RwLock<u64>,
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    sessions: RwLock<HashMap<i64, ConnectionId>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: RwLock::new(1),
            connections: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn next_connection_id(&self) -> ConnectionId {
        let mut id = self.next_id.write().await;
        let current = *id;
        *id += 1;
        current
    }

    /// Track a new, not yet identified, connection.
    pub async fn connect(&self, conn_id: ConnectionId, tx: mpsc::UnboundedSender<String>) {
        self.connections
            .write()
            .await
            .insert(conn_id, Connection { tx, user_id: None });
    }

    /// Bind a connection to a user. The newest connection of a user wins the
    /// routing entry. Returns false if the connection is already gone.
    pub async fn identify(&self, conn_id: ConnectionId, user_id: i64) -> bool {
        let mut connections = self.connections.write().await;
        let mut sessions = self.sessions.write().await;

        let Some(conn) = connections.get_mut(&conn_id) else {
            return false;
        };

        if let Some(previous) = conn.user_id.replace(user_id) {
            if previous != user_id && sessions.get(&previous) == Some(&conn_id) {
                sessions.remove(&previous);
            }
        }
        sessions.insert(user_id, conn_id);
        true
    }

    pub async fn lookup(&self, user_id: i64) -> Option<ConnectionId> {
        self.sessions.read().await.get(&user_id).copied()
    }

    pub async fn user_of(&self, conn_id: ConnectionId) -> Option<i64> {
        self.connections
            .read()
            .await
            .get(&conn_id)
            .and_then(|c| c.user_id)
    }

    /// Drop a connection and its routing entry. An entry that a newer
    /// connection of the same user installed is left untouched.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> Option<Connection> {
        let mut connections = self.connections.write().await;
        let conn = connections.remove(&conn_id)?;

        if let Some(user_id) = conn.user_id {
            let mut sessions = self.sessions.write().await;
            if sessions.get(&user_id) == Some(&conn_id) {
                sessions.remove(&user_id);
            }
        }

        Some(conn)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
