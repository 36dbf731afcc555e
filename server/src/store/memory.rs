//! In-memory store backend.
//!
//! All tables live behind a single RwLock so compound operations (the
//! email-uniqueness check plus insert, in particular) are atomic. State
//! is lost on process restart; there is no durability layer.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use super::models::{
    Appointment, AppointmentStatus, AppointmentUpdate, ChatSummary, Doctor, Message,
    NewAppointment, NewDoctor, NewMessage, NewUser, Role, User, UserUpdate,
};
use super::{Storage, StoreError};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    doctors: HashMap<Uuid, Doctor>,
    appointments: HashMap<Uuid, Appointment>,
    /// Kept as a log, not a map: aggregation depends on insertion order
    /// for its equal-timestamp tie-break.
    messages: Vec<Message>,
}

#[derive(Default)]
pub struct MemStorage {
    inner: RwLock<Tables>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// True when the instant falls inside the server's current local
/// calendar day. An appointment exactly at local midnight belongs to
/// the day it starts.
fn is_today_local(at: DateTime<Utc>) -> bool {
    at.with_timezone(&Local).date_naive() == Local::now().date_naive()
}

impl Storage for MemStorage {
    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.users.get(&id).cloned())
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if tables.users.values().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken);
        }
        let user = User {
            id: Uuid::now_v7(),
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
            phone: new.phone,
            date_of_birth: new.date_of_birth,
            address: new.address,
            emergency_contact: new.emergency_contact,
            emergency_phone: new.emergency_phone,
            medical_history: new.medical_history,
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn update_user(&self, id: Uuid, updates: UserUpdate) -> Result<Option<User>, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(email) = &updates.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::EmailTaken);
            }
        }
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = updates.email {
            user.email = email;
        }
        if let Some(first_name) = updates.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = updates.last_name {
            user.last_name = last_name;
        }
        if let Some(phone) = updates.phone {
            user.phone = Some(phone);
        }
        if let Some(date_of_birth) = updates.date_of_birth {
            user.date_of_birth = Some(date_of_birth);
        }
        if let Some(address) = updates.address {
            user.address = Some(address);
        }
        if let Some(emergency_contact) = updates.emergency_contact {
            user.emergency_contact = Some(emergency_contact);
        }
        if let Some(emergency_phone) = updates.emergency_phone {
            user.emergency_phone = Some(emergency_phone);
        }
        if let Some(medical_history) = updates.medical_history {
            user.medical_history = Some(medical_history);
        }
        Ok(Some(user.clone()))
    }

    fn all_doctors(&self) -> Result<Vec<Doctor>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.doctors.values().cloned().collect())
    }

    fn get_doctor(&self, id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.doctors.get(&id).cloned())
    }

    fn get_doctor_by_user_id(&self, user_id: Uuid) -> Result<Option<Doctor>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .doctors
            .values()
            .find(|d| d.user_id == user_id)
            .cloned())
    }

    fn create_doctor(&self, new: NewDoctor) -> Result<Doctor, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let doctor = Doctor {
            id: Uuid::now_v7(),
            user_id: new.user_id,
            specialty: new.specialty,
            education: new.education,
            experience: new.experience,
            rating: new.rating,
            review_count: new.review_count,
            is_available: new.is_available,
            bio: new.bio,
            created_at: Utc::now(),
        };
        tables.doctors.insert(doctor.id, doctor.clone());
        Ok(doctor)
    }

    fn delete_doctor(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.doctors.remove(&id).is_some())
    }

    fn appointments_by_patient(&self, patient_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect())
    }

    fn appointments_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    fn today_appointments_by_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && is_today_local(a.appointment_date))
            .cloned()
            .collect())
    }

    fn create_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let appointment = Appointment {
            id: Uuid::now_v7(),
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            appointment_date: new.appointment_date,
            appointment_type: new.appointment_type,
            status: new.status.unwrap_or(AppointmentStatus::Scheduled),
            notes: new.notes,
            created_at: Utc::now(),
        };
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn update_appointment(
        &self,
        id: Uuid,
        updates: AppointmentUpdate,
    ) -> Result<Option<Appointment>, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let Some(appointment) = tables.appointments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(appointment_date) = updates.appointment_date {
            appointment.appointment_date = appointment_date;
        }
        if let Some(status) = updates.status {
            appointment.status = status;
        }
        if let Some(notes) = updates.notes {
            appointment.notes = Some(notes);
        }
        Ok(Some(appointment.clone()))
    }

    fn messages_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.receiver_id == b)
                    || (m.sender_id == b && m.receiver_id == a)
            })
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    fn create_message(&self, new: NewMessage) -> Result<Message, StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let message = Message {
            id: Uuid::now_v7(),
            sender_id: new.sender_id,
            receiver_id: new.receiver_id,
            content: new.content,
            timestamp: Utc::now(),
            is_read: false,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    fn mark_messages_read(&self, sender_id: Uuid, receiver_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        for message in tables
            .messages
            .iter_mut()
            .filter(|m| m.sender_id == sender_id && m.receiver_id == receiver_id)
        {
            message.is_read = true;
        }
        Ok(())
    }

    fn chat_list_for_user(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, StoreError> {
        struct Group {
            last: Message,
            unread: usize,
        }

        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;

        // Group by counterpart in log order. The latest message is only
        // adopted on a strictly greater timestamp, so an equal-timestamp
        // pair keeps the earlier-seen entry.
        let mut groups: HashMap<Uuid, Group> = HashMap::new();
        for message in tables
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
        {
            let counterpart = if message.sender_id == user_id {
                message.receiver_id
            } else {
                message.sender_id
            };
            let unread = usize::from(message.receiver_id == user_id && !message.is_read);
            groups
                .entry(counterpart)
                .and_modify(|g| {
                    g.unread += unread;
                    if message.timestamp > g.last.timestamp {
                        g.last = message.clone();
                    }
                })
                .or_insert_with(|| Group {
                    last: message.clone(),
                    unread,
                });
        }

        // Counterparts with no user record are dropped rather than
        // rendered with a missing name.
        let mut rows: Vec<ChatSummary> = groups
            .into_iter()
            .filter_map(|(counterpart, group)| {
                tables.users.get(&counterpart).map(|user| ChatSummary {
                    user_id: counterpart,
                    user_name: user.display_name(),
                    last_message: group.last.content,
                    last_message_time: group.last.timestamp,
                    unread_count: group.unread,
                })
            })
            .collect();
        rows.sort_by(|a, b| b.last_message_time.cmp(&a.last_message_time));
        Ok(rows)
    }

    fn count_users_with_role(&self, role: Role) -> Result<usize, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.users.values().filter(|u| u.role == role).count())
    }

    fn count_appointments_today(&self) -> Result<usize, StoreError> {
        let tables = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables
            .appointments
            .values()
            .filter(|a| is_today_local(a.appointment_date))
            .count())
    }
}

#[cfg(test)]
impl MemStorage {
    /// Insert a message with an explicit timestamp, bypassing the
    /// server-clock assignment. Tests of the aggregation tie-break and
    /// ordering need controlled timestamps.
    fn insert_message_at(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> Message {
        let message = Message {
            id: Uuid::now_v7(),
            sender_id,
            receiver_id,
            content: content.to_string(),
            timestamp,
            is_read: false,
        };
        self.inner
            .write()
            .expect("store lock")
            .messages
            .push(message.clone());
        message
    }
}
