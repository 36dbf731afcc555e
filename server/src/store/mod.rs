//! Entity store: authoritative tables for users, doctors, appointments,
//! and messages, plus the derived conversation view.
//!
//! The store is a trait so handlers never depend on the backing
//! implementation; the in-memory backend in `memory` is the only one
//! today and is injected through `AppState` (no global singleton).

pub mod memory;
pub mod models;
pub mod seed;

use std::sync::Arc;

use uuid::Uuid;

use models::{
    Appointment, AppointmentUpdate, ChatSummary, Doctor, Message, NewAppointment, NewDoctor,
    NewMessage, NewUser, Role, User, UserUpdate,
};

/// Store-level failures. Absent records are `Ok(None)`, never an error,
/// so callers can tell "not found" from infrastructure trouble.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Email uniqueness is enforced atomically inside the store; a
    /// duplicate insert (or an update onto a taken email) fails here.
    #[error("email already registered")]
    EmailTaken,
    /// A writer panicked while holding the table lock.
    #[error("store lock poisoned")]
    Poisoned,
}

pub trait Storage: Send + Sync {
    // User operations
    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn create_user(&self, new: NewUser) -> Result<User, StoreError>;
    fn update_user(&self, id: Uuid, updates: UserUpdate) -> Result<Option<User>, StoreError>;

    // Doctor operations
    fn all_doctors(&self) -> Result<Vec<Doctor>, StoreError>;
    fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError>;
    fn get_doctor_by_user_id(&self, user_id: Uuid) -> Result<Option<Doctor>, StoreError>;
    fn create_doctor(&self, new: NewDoctor) -> Result<Doctor, StoreError>;
    /// Returns whether a record existed and was removed.
    fn delete_doctor(&self, id: Uuid) -> Result<bool, StoreError>;

    // Appointment operations
    fn appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
    fn appointments_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, StoreError>;
    /// Appointments inside the server's local calendar day
    /// [startOfDay, endOfDay): midnight belongs to the day it starts.
    fn today_appointments_by_doctor(&self, doctor_id: Uuid)
        -> Result<Vec<Appointment>, StoreError>;
    fn create_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError>;
    fn update_appointment(
        &self,
        id: Uuid,
        updates: AppointmentUpdate,
    ) -> Result<Option<Appointment>, StoreError>;

    // Message operations
    /// Full history between two users, both directions, sorted by
    /// timestamp ascending. Does not touch read state.
    fn messages_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, StoreError>;
    fn create_message(&self, new: NewMessage) -> Result<Message, StoreError>;
    /// Flip is_read on every message sent by `sender_id` to
    /// `receiver_id`. Idempotent.
    fn mark_messages_read(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<(), StoreError>;
    /// Conversation aggregation: one row per counterpart, recomputed
    /// fully on every call. Never mutates read state.
    fn chat_list_for_user(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, StoreError>;

    // Aggregate counts for the admin dashboard
    fn count_users_with_role(&self, role: Role) -> Result<usize, StoreError>;
    fn count_appointments_today(&self) -> Result<usize, StoreError>;
}

pub type SharedStorage = Arc<dyn Storage>;
