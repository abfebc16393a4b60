use crate::AppState;
use crate::identity;
use crate::ws::events::ServerEvent;
use crate::ws::gateway::ConnectionId;

/// Verify the token with the identity provider and route the user's events
/// to this connection. Failures are logged and otherwise ignored.
pub async fn handle_identify(state: &AppState, conn_id: ConnectionId, token: &str) {
    let user = match identity::authenticate(&state.identity, &state.db, token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("identify-token rejected on connection {}: {}", conn_id, e);
            return;
        }
    };

    if !state.sessions.identify(conn_id, user.id).await {
        // Disconnected while the provider call was in flight.
        return;
    }

    tracing::info!("Connection {} identified as user {}", conn_id, user.id);
    state
        .sessions
        .send_to(conn_id, &ServerEvent::Identified { user_id: user.id })
        .await;
}

pub async fn handle_disconnect(state: &AppState, conn_id: ConnectionId) {
    if let Some(conn) = state.sessions.disconnect(conn_id).await {
        match conn.user_id {
            Some(user_id) => tracing::info!("Connection {} (user {}) closed", conn_id, user_id),
            None => tracing::debug!("Connection {} closed", conn_id),
        }
    }
}
