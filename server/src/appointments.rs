//! Appointment endpoints: role-scoped listing, today's schedule for
//! doctors, and booking.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::auth::middleware::{current_user, require_role, Claims};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::models::{Appointment, NewAppointment, Role};

/// Appointment denormalized with both parties' display names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor_name: String,
    pub patient_name: String,
    pub specialty: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayAppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
}

fn denormalize(state: &AppState, appointment: Appointment) -> Result<AppointmentView, ApiError> {
    let doctor = state.store.get_doctor(appointment.doctor_id)?;
    let doctor_user = match &doctor {
        Some(d) => state.store.get_user(d.user_id)?,
        None => None,
    };
    let patient = state.store.get_user(appointment.patient_id)?;
    Ok(AppointmentView {
        doctor_name: doctor_user
            .map(|u| format!("Dr. {}", u.display_name()))
            .unwrap_or_else(|| "Unknown Doctor".to_string()),
        patient_name: patient
            .map(|u| u.display_name())
            .unwrap_or_else(|| "Unknown Patient".to_string()),
        specialty: doctor.map(|d| d.specialty),
        appointment,
    })
}

/// GET /api/appointments — patients see their own bookings, doctors see
/// their schedule via their doctor profile, anyone else sees nothing.
pub async fn list_appointments(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    let user = current_user(&state, &claims)?;

    let appointments = match user.role {
        Role::Patient => state.store.appointments_by_patient(user.id)?,
        Role::Doctor => match state.store.get_doctor_by_user_id(user.id)? {
            Some(doctor) => state.store.appointments_by_doctor(doctor.id)?,
            None => Vec::new(),
        },
        Role::Admin => Vec::new(),
    };

    appointments
        .into_iter()
        .map(|a| denormalize(&state, a))
        .collect::<Result<Vec<_>, _>>()
        .map(Json)
}

/// GET /api/appointments/today — doctor only, filtered to the server's
/// current local calendar day.
pub async fn today_appointments(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Vec<TodayAppointmentView>>, ApiError> {
    let user = require_role(&state, &claims, Role::Doctor)?;
    let doctor = state
        .store
        .get_doctor_by_user_id(user.id)?
        .ok_or_else(|| ApiError::not_found("Doctor profile not found"))?;

    let mut views = Vec::new();
    for appointment in state.store.today_appointments_by_doctor(doctor.id)? {
        let patient = state.store.get_user(appointment.patient_id)?;
        views.push(TodayAppointmentView {
            patient_name: patient
                .map(|u| u.display_name())
                .unwrap_or_else(|| "Unknown Patient".to_string()),
            appointment,
        });
    }
    Ok(Json(views))
}

/// POST /api/appointments — booking. A patient always books for
/// themselves; the patientId in the payload is overridden.
pub async fn create_appointment(
    State(state): State<AppState>,
    claims: Claims,
    Json(mut body): Json<NewAppointment>,
) -> Result<Json<Appointment>, ApiError> {
    let user = current_user(&state, &claims)?;
    if user.role == Role::Patient {
        body.patient_id = user.id;
    }
    let appointment = state.store.create_appointment(body)?;
    tracing::info!(
        appointment_id = %appointment.id,
        doctor_id = %appointment.doctor_id,
        "appointment booked"
    );
    Ok(Json(appointment))
}
