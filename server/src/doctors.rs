//! Doctor roster endpoints: public listing, admin create/delete.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::middleware::{require_role, Claims};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{Doctor, NewDoctor, Role};

/// Doctor profile denormalized with the owning user's display fields.
#[derive(Debug, Serialize)]
pub struct DoctorView {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub name: String,
    pub email: Option<String>,
}

/// GET /api/doctors — public roster.
/// A profile whose owning user is missing still lists, under
/// "Unknown Doctor"; the invariant that userId references a doctor-role
/// user is conventional, not enforced by the store.
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorView>>, ApiError> {
    let mut views = Vec::new();
    for doctor in state.store.all_doctors()? {
        let user = state.store.get_user(doctor.user_id)?;
        views.push(DoctorView {
            name: user
                .as_ref()
                .map(|u| format!("Dr. {}", u.display_name()))
                .unwrap_or_else(|| "Unknown Doctor".to_string()),
            email: user.map(|u| u.email),
            doctor,
        });
    }
    Ok(Json(views))
}

/// POST /api/doctors — admin only.
pub async fn create_doctor(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<NewDoctor>,
) -> Result<Json<Doctor>, ApiError> {
    require_role(&state, &claims, Role::Admin)?;
    let doctor = state.store.create_doctor(body)?;
    tracing::info!(doctor_id = %doctor.id, specialty = %doctor.specialty, "doctor created");
    Ok(Json(doctor))
}

/// DELETE /api/doctors/{id} — admin only; 404 when absent.
pub async fn delete_doctor(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_role(&state, &claims, Role::Admin)?;
    if !state.store.delete_doctor(id)? {
        return Err(ApiError::not_found("Doctor not found"));
    }
    tracing::info!(doctor_id = %id, "doctor removed");
    Ok(Json(json!({ "message": "Doctor removed successfully" })))
}
