use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

use putry_shared::constants::{
    MAX_TRENDING_DAYS, MAX_TRENDING_HOURS, TRENDING_CHANNEL_DAYS, TRENDING_LIMIT,
    TRENDING_POST_HOURS,
};
use putry_shared::validation::clamp_limit;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{ChannelTrend, TrendingPost};
use crate::AppState;

#[derive(Deserialize)]
pub struct TrendingPostsQuery {
    pub hours: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct TrendingChannelsQuery {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /trending/posts?hours=&limit=
///
/// Score is likes + reposts inside the window; equal scores rank newer first.
pub async fn trending_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrendingPostsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TrendingPost>>> {
    let Query(query) = query?;
    let hours = query.hours.unwrap_or(TRENDING_POST_HOURS);
    if !(1..=MAX_TRENDING_HOURS).contains(&hours) {
        return Err(ApiError::bad_request(format!(
            "hours must be between 1 and {}",
            MAX_TRENDING_HOURS
        )));
    }
    let cutoff = db::timestamp(Utc::now() - Duration::hours(hours));

    let posts = sqlx::query_as::<_, TrendingPost>(
        r#"SELECT p.*, u.username AS author_username, u.name AS author_name,
                  (p.likes + p.reposts) AS score
           FROM posts p
           LEFT JOIN users u ON p.author_id = u.id
           WHERE p.created_at >= ?
           ORDER BY score DESC, p.created_at DESC, p.id DESC
           LIMIT ?"#,
    )
    .bind(&cutoff)
    .bind(clamp_limit(query.limit, TRENDING_LIMIT))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(posts))
}

/// GET /trending/channels?days=&limit=
///
/// Channels ranked by how many posts they received inside the window.
pub async fn trending_channels(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrendingChannelsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ChannelTrend>>> {
    let Query(query) = query?;
    let days = query.days.unwrap_or(TRENDING_CHANNEL_DAYS);
    if !(1..=MAX_TRENDING_DAYS).contains(&days) {
        return Err(ApiError::bad_request(format!(
            "days must be between 1 and {}",
            MAX_TRENDING_DAYS
        )));
    }
    let cutoff = db::timestamp(Utc::now() - Duration::days(days));

    let channels = sqlx::query_as::<_, ChannelTrend>(
        r#"SELECT c.id, c.label, COUNT(p.id) AS post_count
           FROM channels c
           LEFT JOIN posts p ON p.channel_id = c.id AND p.created_at >= ?
           GROUP BY c.id, c.label
           ORDER BY post_count DESC, c.id ASC
           LIMIT ?"#,
    )
    .bind(&cutoff)
    .bind(clamp_limit(query.limit, TRENDING_LIMIT))
    .fetch_all(&state.db)
    .await?;

    Ok(Json(channels))
}
