use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub created_at: String,
}

impl Message {
    /// The other participant, seen from `user_id`.
    pub fn counterpart(&self, user_id: i64) -> i64 {
        if self.sender_id == user_id {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Conversation {
    #[serde(rename = "withUserId")]
    pub with_user_id: i64,
    pub messages: Vec<Message>,
}
