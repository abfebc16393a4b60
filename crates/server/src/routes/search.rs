use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use putry_shared::constants::{CHANNEL_SEARCH_LIMIT, POST_SEARCH_LIMIT, USER_SEARCH_LIMIT};
use putry_shared::validation::clamp_limit;

use crate::error::ApiResult;
use crate::models::{Channel, FeedPost, UserSummary};
use crate::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    /// `None` when the query is missing or blank; such searches return nothing.
    fn pattern(&self) -> Option<String> {
        let q = self.q.as_deref()?.trim();
        if q.is_empty() {
            return None;
        }
        Some(substring_regex(q))
    }
}

/// Case-insensitive literal substring match, with Unicode case folding.
/// Evaluated by SQLite's `REGEXP`, so `émile` finds `Émile`.
pub fn substring_regex(query: &str) -> String {
    format!("(?i){}", regex_lite::escape(query))
}

/// GET /search/users?q=
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<UserSummary>>> {
    let Query(query) = query?;
    let Some(pattern) = query.pattern() else {
        return Ok(Json(Vec::new()));
    };

    let users = sqlx::query_as::<_, UserSummary>(
        r#"SELECT id, name, username, bio, avatar_url, badge FROM users
           WHERE COALESCE(username, '') REGEXP ? OR name REGEXP ?
           ORDER BY id ASC
           LIMIT ?"#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(clamp_limit(query.limit, USER_SEARCH_LIMIT))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(users))
}

/// GET /search/posts?q=
pub async fn search_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<FeedPost>>> {
    let Query(query) = query?;
    let Some(pattern) = query.pattern() else {
        return Ok(Json(Vec::new()));
    };

    let posts = sqlx::query_as::<_, FeedPost>(
        r#"SELECT p.*, u.name AS author_name, u.username AS author_username, u.badge AS author_badge
           FROM posts p
           LEFT JOIN users u ON p.author_id = u.id
           WHERE p.body REGEXP ?
           ORDER BY p.created_at DESC, p.id DESC
           LIMIT ?"#,
    )
    .bind(&pattern)
    .bind(clamp_limit(query.limit, POST_SEARCH_LIMIT))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(posts))
}

/// GET /search/channels?q=
pub async fn search_channels(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Channel>>> {
    let Query(query) = query?;
    let Some(pattern) = query.pattern() else {
        return Ok(Json(Vec::new()));
    };

    let channels = sqlx::query_as::<_, Channel>(
        r#"SELECT * FROM channels
           WHERE label REGEXP ?
           ORDER BY created_at DESC, id DESC
           LIMIT ?"#,
    )
    .bind(&pattern)
    .bind(clamp_limit(query.limit, CHANNEL_SEARCH_LIMIT))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(channels))
}
