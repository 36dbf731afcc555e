//! Admin dashboard aggregates.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::middleware::{require_role, Claims};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::Role;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_doctors: usize,
    pub total_patients: usize,
    pub today_appointments: usize,
    /// Static demo value; no issue tracker exists behind this number.
    pub pending_issues: usize,
}

/// GET /api/admin/stats — admin only.
pub async fn stats(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<AdminStats>, ApiError> {
    require_role(&state, &claims, Role::Admin)?;
    Ok(Json(AdminStats {
        total_doctors: state.store.all_doctors()?.len(),
        total_patients: state.store.count_users_with_role(Role::Patient)?,
        today_appointments: state.store.count_appointments_today()?,
        pending_issues: 3,
    }))
}
