//! Profile self-service update.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::middleware::{current_user, Claims};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{User, UserUpdate};

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// PUT /api/profile — partial update of the caller's own record.
/// The payload type cannot express id, password, or role, so those
/// fields are immutable through this path by construction.
pub async fn update_profile(
    State(state): State<AppState>,
    claims: Claims,
    Json(updates): Json<UserUpdate>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = current_user(&state, &claims)?;
    let updated = state
        .store
        .update_user(user.id, updates)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(ProfileResponse { user: updated }))
}
