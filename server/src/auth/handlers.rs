//! Login, signup, and current-user endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::{current_user, Claims};
use crate::auth::{jwt, password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{NewUser, Role, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

/// POST /api/auth/login
/// The role in the request must match the account's role; a mismatch is
/// indistinguishable from a bad password on the wire.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state
        .store
        .get_user_by_email(&body.email)?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !password::verify(&body.password, &user.password_hash) || user.role != body.role {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = jwt::issue_token(&state.jwt_secret, &user, state.token_ttl_hours)
        .map_err(|_| ApiError::internal())?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "login");
    Ok(Json(SessionResponse { token, user }))
}

/// POST /api/auth/signup
/// Email uniqueness is enforced inside the store, so two racing signups
/// with the same email cannot both succeed.
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    if body.password.len() < 6 {
        return Err(ApiError::bad_request("Invalid request data"));
    }

    let user = state.store.create_user(NewUser {
        email: body.email,
        password_hash: password::hash(&body.password),
        first_name: body.first_name,
        last_name: body.last_name,
        role: body.role,
        phone: body.phone,
        date_of_birth: body.date_of_birth,
        address: body.address,
        emergency_contact: body.emergency_contact,
        emergency_phone: body.emergency_phone,
        medical_history: body.medical_history,
    })?;

    let token = jwt::issue_token(&state.jwt_secret, &user, state.token_ttl_hours)
        .map_err(|_| ApiError::internal())?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "signup");
    Ok(Json(SessionResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<MeResponse>, ApiError> {
    let user = current_user(&state, &claims)?;
    Ok(Json(MeResponse { user }))
}
