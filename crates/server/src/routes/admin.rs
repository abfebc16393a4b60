use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use putry_shared::role::Role;

use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{require_active, require_role};
use crate::models::{AdminRequest, AuthUser};
use crate::AppState;

use super::users::set_banned;

/// POST /admin (admin only)
///
/// `{"action": "change_role", "user_id": 7, "role": "moderator"}` or
/// `{"action": "ban_user", "user_id": 7, "ban": true}`.
pub async fn admin_action(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    body: Result<Json<AdminRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    require_role(&caller, &[Role::Admin])?;
    require_active(&caller)?;

    match body.action.as_str() {
        "change_role" => {
            let role = body
                .role
                .as_deref()
                .and_then(Role::parse)
                .ok_or_else(|| ApiError::bad_request("Invalid role"))?;

            if caller.id == body.user_id && role != Role::Admin {
                return Err(ApiError::bad_request("Cannot demote yourself"));
            }

            let result = sqlx::query("UPDATE users SET role = ? WHERE id = ?")
                .bind(role.as_str())
                .bind(body.user_id)
                .execute(&state.db)
                .await?;
            if result.rows_affected() == 0 {
                return Err(ApiError::not_found("User not found"));
            }
            tracing::info!("Admin {} set role of user {} to {}", caller.id, body.user_id, role);
        }
        "ban_user" => {
            let ban = body
                .ban
                .ok_or_else(|| ApiError::bad_request("Missing ban flag"))?;
            if caller.id == body.user_id && ban {
                return Err(ApiError::bad_request("Cannot ban yourself"));
            }
            set_banned(&state, body.user_id, ban).await?;
            tracing::info!("Admin {} set banned={} for user {}", caller.id, ban, body.user_id);
        }
        _ => return Err(ApiError::bad_request("Unknown action")),
    }

    Ok(Json(json!({"ok": true})))
}
