use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use putry_shared::role::Role;
use putry_shared::validation::validate_channel_label;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{require_active, require_role};
use crate::models::{AuthUser, Channel, CreateChannelRequest};
use crate::AppState;

/// GET /channels
pub async fn list_channels(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Channel>>> {
    let channels = sqlx::query_as::<_, Channel>(
        "SELECT * FROM channels ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(channels))
}

/// POST /channels (moderator or admin)
pub async fn create_channel(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    body: Result<Json<CreateChannelRequest>, JsonRejection>,
) -> ApiResult<Json<Channel>> {
    let Json(body) = body?;
    require_role(&caller, &Role::STAFF)?;
    require_active(&caller)?;

    let label = body.label.trim();
    validate_channel_label(label).map_err(ApiError::BadRequest)?;

    let taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM channels WHERE label = ?")
        .bind(label)
        .fetch_one(&state.db)
        .await?;
    if taken > 0 {
        return Err(ApiError::bad_request("Channel already exists"));
    }

    let channel = sqlx::query_as::<_, Channel>(
        "INSERT INTO channels (label, created_at) VALUES (?, ?) RETURNING *",
    )
    .bind(label)
    .bind(db::now())
    .fetch_one(&state.db)
    .await?;

    tracing::info!("User {} created channel {} ({})", caller.id, channel.id, channel.label);
    Ok(Json(channel))
}
