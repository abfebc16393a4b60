//! Identity-provider token verification and the local user upsert.
//!
//! The provider exchanges a client bearer token for the account it was issued
//! to. Nothing is cached: every request and every realtime `identify-token`
//! goes back to the provider.

use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db;
use crate::error::ApiError;
use crate::models::User;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid token")]
    Rejected,
    #[error("Provider account has no email")]
    NoEmail,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Rejected | IdentityError::NoEmail => {
                ApiError::Unauthorized(err.to_string())
            }
            IdentityError::Unavailable(detail) => {
                tracing::error!("Identity provider error: {}", detail);
                ApiError::Internal("Auth verification failed".into())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    user: Option<ProviderUser>,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    id: String,
    email: Option<EmailAccount>,
    google: Option<GoogleAccount>,
    twitter: Option<TwitterAccount>,
}

#[derive(Debug, Deserialize)]
struct EmailAccount {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleAccount {
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwitterAccount {
    username: Option<String>,
    profile_picture_url: Option<String>,
}

/// Identity attributes resolved from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl ProviderUser {
    fn into_identity(self) -> Result<VerifiedIdentity, IdentityError> {
        let email = self
            .email
            .and_then(|e| e.address)
            .filter(|a| !a.trim().is_empty())
            .ok_or(IdentityError::NoEmail)?;

        let google_name = self.google.as_ref().and_then(|g| g.name.clone());
        let twitter_name = self.twitter.as_ref().and_then(|t| t.username.clone());

        let name = google_name
            .clone()
            .or_else(|| twitter_name.clone())
            .unwrap_or_else(|| "New User".to_string());
        let username = google_name
            .or(twitter_name)
            .unwrap_or_else(|| format!("user_{}", self.id.chars().take(6).collect::<String>()));
        let avatar_url = self
            .google
            .and_then(|g| g.picture)
            .or_else(|| self.twitter.and_then(|t| t.profile_picture_url));

        Ok(VerifiedIdentity {
            provider_id: self.id,
            email,
            name,
            username,
            avatar_url,
        })
    }
}

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    verify_url: String,
    app_secret: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, verify_url: String, app_secret: String) -> Self {
        Self {
            http,
            verify_url,
            app_secret,
        }
    }

    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let res = self
            .http
            .post(&self.verify_url)
            .bearer_auth(&self.app_secret)
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("network error: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            tracing::debug!("Identity provider rejected token ({})", status);
            return Err(IdentityError::Rejected);
        }

        let body: VerifyResponse = res
            .json()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("bad response body: {}", e)))?;

        body.user
            .ok_or(IdentityError::Rejected)?
            .into_identity()
    }
}

/// Insert-or-update keyed on email. An existing row keeps its role, badge and
/// banned flag; only the display name is refreshed.
pub async fn upsert_user(db: &SqlitePool, identity: &VerifiedIdentity) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"INSERT INTO users (email, name, username, avatar_url, role, badge, banned, privy_id, created_at)
           VALUES (?, ?, ?, ?, 'member', 0, 0, ?, ?)
           ON CONFLICT(email) DO UPDATE SET name = excluded.name
           RETURNING *"#,
    )
    .bind(&identity.email)
    .bind(&identity.name)
    .bind(&identity.username)
    .bind(&identity.avatar_url)
    .bind(&identity.provider_id)
    .bind(db::now())
    .fetch_one(db)
    .await
}

/// Verify a token and resolve it to the local user row.
pub async fn authenticate(
    client: &IdentityClient,
    db: &SqlitePool,
    token: &str,
) -> Result<User, ApiError> {
    let identity = client.verify(token).await?;
    Ok(upsert_user(db, &identity).await?)
}
