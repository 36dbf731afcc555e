//! JWT claims extracted from the Authorization: Bearer header.
//!
//! A missing or non-bearer header is 401; a malformed, expired, or
//! wrongly-signed token is 403. Handlers that need the full record call
//! `current_user`, which re-resolves the user from the store so role or
//! identity changes are observed promptly rather than cached in the
//! token.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (UUIDv7)
    pub sub: Uuid,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

        // Secret is placed in request extensions by the router middleware
        let jwt_secret = parts
            .extensions
            .get::<JwtSecret>()
            .ok_or_else(ApiError::internal)?;

        crate::auth::jwt::validate_token(&jwt_secret.0, token)
            .map_err(|_| ApiError::forbidden("Invalid token"))
    }
}

/// JWT secret stored in request extensions for the Claims extractor
#[derive(Clone)]
pub struct JwtSecret(pub Vec<u8>);

/// Re-resolve the authenticated user from the store. 401 when the
/// record no longer exists.
pub fn current_user(state: &AppState, claims: &Claims) -> Result<User, ApiError> {
    state
        .store
        .get_user(claims.sub)?
        .ok_or_else(|| ApiError::unauthorized("User not found"))
}

/// `current_user` plus a role gate. 403 on mismatch.
pub fn require_role(state: &AppState, claims: &Claims, role: Role) -> Result<User, ApiError> {
    let user = current_user(state, claims)?;
    if user.role != role {
        return Err(ApiError::forbidden(format!(
            "{} access required",
            capitalize(role.as_str())
        )));
    }
    Ok(user)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
