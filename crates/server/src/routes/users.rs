use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use putry_shared::role::Role;
use putry_shared::validation::{validate_bio, validate_display_name, validate_username};

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{require_active, require_role};
use crate::models::{AuthUser, UpdateUserRequest, User};
use crate::AppState;

use super::validate_http_url;

/// GET /users
pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<User>>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id ASC")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(users))
}

/// GET /users/me
pub async fn get_me(AuthUser(caller): AuthUser) -> Json<User> {
    Json(caller)
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<User>> {
    let Path(user_id) = path?;
    fetch_user(&state, user_id).await.map(Json)
}

/// PATCH /users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<User>> {
    let Path(user_id) = path?;
    let Json(body) = body?;

    if caller.id != user_id {
        require_role(&caller, &Role::STAFF)?;
    }
    require_active(&caller)?;
    if body.badge.is_some() && !caller.is_staff() {
        return Err(ApiError::forbidden("Only moderators can change badges"));
    }

    let mut user = fetch_user(&state, user_id).await?;

    if let Some(name) = body.name {
        validate_display_name(&name).map_err(ApiError::BadRequest)?;
        user.name = name.trim().to_string();
    }
    if let Some(username) = body.username {
        let trimmed = username.trim();
        validate_username(trimmed).map_err(ApiError::BadRequest)?;
        user.username = Some(trimmed.to_string());
    }
    if let Some(bio) = body.bio {
        if let Some(ref text) = bio {
            validate_bio(text).map_err(ApiError::BadRequest)?;
        }
        user.bio = bio;
    }
    if let Some(badge) = body.badge {
        if badge < 0 {
            return Err(ApiError::bad_request("Badge must not be negative"));
        }
        user.badge = badge;
    }
    if let Some(avatar_url) = body.avatar_url {
        if let Some(ref url) = avatar_url {
            validate_http_url(url)?;
        }
        user.avatar_url = avatar_url;
    }

    let updated = sqlx::query_as::<_, User>(
        r#"UPDATE users SET name = ?, username = ?, bio = ?, badge = ?, avatar_url = ?
           WHERE id = ?
           RETURNING *"#,
    )
    .bind(&user.name)
    .bind(&user.username)
    .bind(&user.bio)
    .bind(user.badge)
    .bind(&user.avatar_url)
    .bind(user_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(updated))
}

/// POST /users/:id/ban (moderator or admin)
pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(user_id) = path?;
    require_role(&caller, &Role::STAFF)?;
    require_active(&caller)?;

    if caller.id == user_id {
        return Err(ApiError::bad_request("Cannot ban yourself"));
    }

    set_banned(&state, user_id, true).await?;
    tracing::info!("User {} banned user {}", caller.id, user_id);

    Ok(Json(json!({"status": "ok"})))
}

pub(crate) async fn fetch_user(state: &AppState, user_id: i64) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

pub(crate) async fn set_banned(state: &AppState, user_id: i64, banned: bool) -> Result<(), ApiError> {
    let result = sqlx::query("UPDATE users SET banned = ? WHERE id = ?")
        .bind(banned)
        .bind(user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(())
}
