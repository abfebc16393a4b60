pub mod admin;
pub mod channels;
pub mod messages;
pub mod posts;
pub mod search;
pub mod trending;
pub mod upload;
pub mod users;

use crate::error::ApiError;
use crate::ws;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = (state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES) as usize;

    Router::new()
        .route("/", get(health))
        // Posts
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/{id}/replies", get(posts::list_replies).post(posts::create_reply))
        .route("/posts/{id}/like", post(posts::like_post))
        .route("/posts/{id}/repost", post(posts::repost_post))
        // Channels
        .route("/channels", get(channels::list_channels).post(channels::create_channel))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::get_me))
        .route("/users/{id}", get(users::get_user).patch(users::update_user))
        .route("/users/{id}/ban", post(users::ban_user))
        .route("/admin", post(admin::admin_action))
        // Direct messages
        .route("/conversations", get(messages::list_conversations))
        .route("/messages", get(messages::list_messages))
        // Uploads
        .route(
            "/upload-avatar",
            post(upload::upload_avatar).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Search & trending
        .route("/search/users", get(search::search_users))
        .route("/search/posts", get(search::search_posts))
        .route("/search/channels", get(search::search_channels))
        .route("/trending/posts", get(trending::trending_posts))
        .route("/trending/channels", get(trending::trending_channels))
        // Realtime
        .route("/gateway", get(ws::handler::ws_handler))
        .with_state(state)
}

/// GET /
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "now": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Accept only absolute http(s) URLs for user-supplied links.
pub(crate) fn validate_http_url(raw: &str) -> Result<(), ApiError> {
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ApiError::bad_request("Invalid URL")),
    }
}
