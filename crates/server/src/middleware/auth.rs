use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use putry_shared::role::Role;

use crate::error::ApiError;
use crate::identity;
use crate::models::{AuthUser, User};
use crate::AppState;

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Missing token".into()))?;

        let user = identity::authenticate(&state.identity, &state.db, token).await?;
        Ok(AuthUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reject the caller unless their role is one of `allowed`.
pub fn require_role(user: &User, allowed: &[Role]) -> Result<(), ApiError> {
    if user.has_role(allowed) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Forbidden"))
    }
}

/// Banned accounts can still read but never write.
pub fn require_active(user: &User) -> Result<(), ApiError> {
    if user.banned {
        Err(ApiError::forbidden("Account is banned"))
    } else {
        Ok(())
    }
}
