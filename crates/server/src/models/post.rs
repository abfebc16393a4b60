use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub body: String,
    pub channel_id: Option<i64>,
    pub quote_of: Option<i64>,
    pub image: Option<String>,
    pub likes: i64,
    pub reposts: i64,
    pub created_at: String,
}

/// A post joined with its author's display fields.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FeedPost {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    pub author_badge: Option<i64>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TrendingPost {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author_name: Option<String>,
    pub author_username: Option<String>,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reply {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub body: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Channel {
    pub id: i64,
    pub label: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ChannelTrend {
    pub id: i64,
    pub label: String,
    pub post_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub author: Option<i64>,
    pub body: String,
    pub channel_id: Option<i64>,
    pub quote_of: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReplyRequest {
    pub author: Option<i64>,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateChannelRequest {
    pub label: String,
}
