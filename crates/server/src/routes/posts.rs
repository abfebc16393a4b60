use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use putry_shared::constants::FEED_PAGE_SIZE;
use putry_shared::validation::{clamp_limit, validate_post_body, validate_reply_body};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::require_active;
use crate::models::{AuthUser, CreatePostRequest, CreateReplyRequest, FeedPost, Post, Reply, User};
use crate::ws::events::ServerEvent;
use crate::AppState;

use super::validate_http_url;

const FEED_SELECT: &str = r#"SELECT p.*, u.name AS author_name, u.username AS author_username, u.badge AS author_badge
    FROM posts p
    LEFT JOIN users u ON p.author_id = u.id"#;

#[derive(Deserialize)]
pub struct FeedQuery {
    pub channel_id: Option<i64>,
    pub author_id: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FeedQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<FeedPost>>> {
    let Query(query) = query?;
    let limit = clamp_limit(query.limit, FEED_PAGE_SIZE);

    let sql = format!(
        "{FEED_SELECT}
         WHERE (? IS NULL OR p.channel_id = ?)
           AND (? IS NULL OR p.author_id = ?)
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?"
    );
    let posts = sqlx::query_as::<_, FeedPost>(&sql)
        .bind(query.channel_id)
        .bind(query.channel_id)
        .bind(query.author_id)
        .bind(query.author_id)
        .bind(limit)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(posts))
}

/// GET /posts/:id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<FeedPost>> {
    let Path(post_id) = path?;
    fetch_feed_post(&state, post_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

/// POST /posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<Json<FeedPost>> {
    let Json(body) = body?;
    require_active(&caller)?;
    check_author(&caller, body.author)?;
    validate_post_body(&body.body).map_err(ApiError::BadRequest)?;

    if let Some(image) = body.image.as_deref() {
        validate_http_url(image)?;
    }

    if let Some(channel_id) = body.channel_id {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM channels WHERE id = ?")
            .bind(channel_id)
            .fetch_one(&state.db)
            .await?;
        if exists == 0 {
            return Err(ApiError::bad_request("Channel not found"));
        }
    }

    if let Some(quote_of) = body.quote_of {
        let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = ?")
            .bind(quote_of)
            .fetch_one(&state.db)
            .await?;
        if exists == 0 {
            return Err(ApiError::bad_request("Quoted post not found"));
        }
    }

    let id = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO posts (author_id, body, channel_id, quote_of, image, created_at)
           VALUES (?, ?, ?, ?, ?, ?)
           RETURNING id"#,
    )
    .bind(caller.id)
    .bind(body.body.trim())
    .bind(body.channel_id)
    .bind(body.quote_of)
    .bind(&body.image)
    .bind(db::now())
    .fetch_one(&state.db)
    .await?;

    let post = fetch_feed_post(&state, id)
        .await?
        .ok_or_else(|| ApiError::Internal("Failed to load created post".into()))?;

    state
        .sessions
        .broadcast_all(&ServerEvent::NewPost { post: post.clone() })
        .await;

    Ok(Json(post))
}

/// GET /posts/:id/replies
pub async fn list_replies(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<Reply>>> {
    let Path(post_id) = path?;
    ensure_post_exists(&state, post_id).await?;

    let replies = sqlx::query_as::<_, Reply>(
        "SELECT * FROM replies WHERE post_id = ? ORDER BY created_at ASC, id ASC",
    )
    .bind(post_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(replies))
}

/// POST /posts/:id/replies
pub async fn create_reply(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<CreateReplyRequest>, JsonRejection>,
) -> ApiResult<Json<Reply>> {
    let Path(post_id) = path?;
    let Json(body) = body?;
    require_active(&caller)?;
    check_author(&caller, body.author)?;
    validate_reply_body(&body.body).map_err(ApiError::BadRequest)?;
    ensure_post_exists(&state, post_id).await?;

    let reply = sqlx::query_as::<_, Reply>(
        r#"INSERT INTO replies (post_id, author_id, body, created_at)
           VALUES (?, ?, ?, ?)
           RETURNING *"#,
    )
    .bind(post_id)
    .bind(caller.id)
    .bind(body.body.trim())
    .bind(db::now())
    .fetch_one(&state.db)
    .await?;

    state
        .sessions
        .broadcast_all(&ServerEvent::NewNotification {
            message: format!("New reply on post {}", post_id),
            post_id,
            reply_id: reply.id,
        })
        .await;

    Ok(Json(reply))
}

/// POST /posts/:id/like
pub async fn like_post(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Post>> {
    let Path(post_id) = path?;
    require_active(&caller)?;
    bump_counter(&state, post_id, Counter::Likes).await
}

/// POST /posts/:id/repost
pub async fn repost_post(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Post>> {
    let Path(post_id) = path?;
    require_active(&caller)?;
    bump_counter(&state, post_id, Counter::Reposts).await
}

enum Counter {
    Likes,
    Reposts,
}

async fn bump_counter(state: &AppState, post_id: i64, counter: Counter) -> ApiResult<Json<Post>> {
    let sql = match counter {
        Counter::Likes => "UPDATE posts SET likes = likes + 1 WHERE id = ? RETURNING *",
        Counter::Reposts => "UPDATE posts SET reposts = reposts + 1 WHERE id = ? RETURNING *",
    };

    sqlx::query_as::<_, Post>(sql)
        .bind(post_id)
        .fetch_optional(&state.db)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

/// The author field in write bodies is optional but, when sent, must name the caller.
fn check_author(caller: &User, author: Option<i64>) -> Result<(), ApiError> {
    match author {
        Some(id) if id != caller.id => Err(ApiError::forbidden("Cannot post as another user")),
        _ => Ok(()),
    }
}

async fn ensure_post_exists(state: &AppState, post_id: i64) -> Result<(), ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE id = ?")
        .bind(post_id)
        .fetch_one(&state.db)
        .await?;
    if exists == 0 {
        return Err(ApiError::not_found("Post not found"));
    }
    Ok(())
}

async fn fetch_feed_post(state: &AppState, post_id: i64) -> Result<Option<FeedPost>, sqlx::Error> {
    let sql = format!("{FEED_SELECT} WHERE p.id = ?");
    sqlx::query_as::<_, FeedPost>(&sql)
        .bind(post_id)
        .fetch_optional(&state.db)
        .await
}
