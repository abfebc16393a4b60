use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::models::{AuthUser, Conversation, Message};
use crate::AppState;

#[derive(Deserialize)]
pub struct PairQuery {
    pub user1: i64,
    pub user2: i64,
}

/// GET /conversations
///
/// Every message the caller sent or received, grouped by the other party.
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<Conversation>>> {
    let rows = sqlx::query_as::<_, Message>(
        r#"SELECT * FROM messages
           WHERE sender_id = ? OR receiver_id = ?
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(caller.id)
    .bind(caller.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(group_by_counterpart(caller.id, rows)))
}

/// GET /messages?user1=&user2=
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    query: Result<Query<PairQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Message>>> {
    let Query(pair) = query?;
    if caller.id != pair.user1 && caller.id != pair.user2 {
        return Err(ApiError::forbidden("Not a participant"));
    }

    let messages = sqlx::query_as::<_, Message>(
        r#"SELECT * FROM messages
           WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)
           ORDER BY created_at ASC, id ASC"#,
    )
    .bind(pair.user1)
    .bind(pair.user2)
    .bind(pair.user2)
    .bind(pair.user1)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(messages))
}

/// Group chronologically ordered messages into one conversation per
/// counterpart, counterparts in ascending id order.
pub fn group_by_counterpart(user_id: i64, messages: Vec<Message>) -> Vec<Conversation> {
    let mut groups: BTreeMap<i64, Vec<Message>> = BTreeMap::new();
    for message in messages {
        groups
            .entry(message.counterpart(user_id))
            .or_default()
            .push(message);
    }

    groups
        .into_iter()
        .map(|(with_user_id, messages)| Conversation {
            with_user_id,
            messages,
        })
        .collect()
}
