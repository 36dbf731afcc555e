//! Entity types held by the store, plus the insert/update payloads.
//! Wire format is camelCase JSON throughout, matching the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role. Gates both REST endpoints and token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Admin => "admin",
        }
    }
}

/// Identity record. The password hash is never serialized to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub medical_history: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display name used in conversation rows and appointment views.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Insert payload for a user. The password arrives pre-hashed; handlers
/// own the plaintext-to-hash step.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
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

/// Partial user update. Identity, password, and role are not
/// representable here, so the profile path cannot touch them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub medical_history: Option<String>,
}

/// Professional profile owned by a user with role=doctor.
///
/// `rating` is a scaled integer in tenths: 47 means 4.7. Kept as an
/// integer at the boundary; clients divide by 10 for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: Uuid,
    pub specialty: String,
    pub education: Option<String>,
    /// Years of experience
    pub experience: Option<i32>,
    /// Tenths of a star: 47 == 4.7
    pub rating: Option<i32>,
    pub review_count: Option<i32>,
    pub is_available: Option<bool>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDoctor {
    pub user_id: Uuid,
    pub specialty: String,
    pub education: Option<String>,
    pub experience: Option<i32>,
    pub rating: Option<i32>,
    pub review_count: Option<i32>,
    pub is_available: Option<bool>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentType {
    Consultation,
    Followup,
    Checkup,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

/// A booking between a patient and a doctor profile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    /// Defaults to scheduled when unspecified
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentUpdate {
    pub appointment_date: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

/// One chat line. Immutable after creation except for the read flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    /// Assigned server-side at creation; caller timestamps are ignored
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}

/// One row of the conversation list: the latest exchange with a single
/// counterpart plus how many of their messages are still unread.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub user_id: Uuid,
    pub user_name: String,
    pub last_message: String,
    pub last_message_time: DateTime<Utc>,
    pub unread_count: usize,
}
