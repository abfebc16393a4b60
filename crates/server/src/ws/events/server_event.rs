use serde::Serialize;

use crate::models::{FeedPost, Message};

// ── Server → Client Events ──

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Identified {
        user_id: i64,
    },
    NewMessage {
        message: Message,
    },
    NewPost {
        post: FeedPost,
    },
    NewNotification {
        message: String,
        post_id: i64,
        reply_id: i64,
    },
}
