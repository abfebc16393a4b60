use putry_shared::validation::validate_message_body;

use crate::AppState;
use crate::db;
use crate::models::Message;
use crate::ws::events::ServerEvent;
use crate::ws::gateway::ConnectionId;

/// Persist a direct message, then deliver it once to the recipient's live
/// session and once back to the sender's connection.
pub async fn handle_send_message(
    state: &AppState,
    conn_id: ConnectionId,
    from: Option<i64>,
    to: i64,
    body: String,
) {
    let Some(sender_id) = state.sessions.user_of(conn_id).await else {
        tracing::debug!("send_message from unidentified connection {} dropped", conn_id);
        return;
    };

    if from.is_some_and(|f| f != sender_id) {
        tracing::warn!(
            "send_message on connection {} claims sender {:?} but is user {}",
            conn_id,
            from,
            sender_id
        );
        return;
    }

    if let Err(e) = validate_message_body(&body) {
        tracing::debug!("send_message from user {} rejected: {}", sender_id, e);
        return;
    }

    let banned = sqlx::query_scalar::<_, bool>("SELECT banned FROM users WHERE id = ?")
        .bind(sender_id)
        .fetch_optional(&state.db)
        .await;
    match banned {
        Ok(Some(false)) => {}
        Ok(_) => {
            tracing::debug!("send_message from banned or unknown user {} dropped", sender_id);
            return;
        }
        Err(e) => {
            tracing::error!("Failed to load sender {}: {:?}", sender_id, e);
            return;
        }
    }

    let saved = sqlx::query_as::<_, Message>(
        r#"INSERT INTO messages (sender_id, receiver_id, body, created_at)
           VALUES (?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(sender_id)
    .bind(to)
    .bind(&body)
    .bind(db::now())
    .fetch_one(&state.db)
    .await;

    let message = match saved {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("Failed to insert message: {:?}", e);
            return;
        }
    };

    let event = ServerEvent::NewMessage { message };

    if to != sender_id {
        state.sessions.send_to_user(to, &event).await;
    }
    state.sessions.send_to(conn_id, &event).await;
}
