use serde::{Deserialize, Serialize};

use putry_shared::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip)]
    pub privy_id: Option<String>,
    pub name: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub badge: i64,
    pub banned: bool,
    pub created_at: String,
}

impl User {
    /// Unknown role strings never grant anything.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        self.role().is_some_and(|r| allowed.contains(&r))
    }

    pub fn is_staff(&self) -> bool {
        self.role().is_some_and(|r| r.is_staff())
    }
}

/// Public projection used by search results.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub badge: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub bio: Option<Option<String>>,
    pub badge: Option<i64>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub avatar_url: Option<Option<String>>,
}

/// Body of `POST /admin`. `action` selects which of the optional fields apply.
#[derive(Debug, Deserialize)]
pub struct AdminRequest {
    pub action: String,
    pub user_id: i64,
    pub role: Option<String>,
    pub ban: Option<bool>,
}
