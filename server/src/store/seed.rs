//! Demo data seeding, enabled with `--seed-demo-data`.
//!
//! Mirrors the demo roster the client expects: one admin, two doctors
//! with static ratings/review counts, one patient, and an upcoming
//! appointment.

use chrono::{Duration, Utc};

use crate::auth::password;
use crate::store::models::{AppointmentType, NewAppointment, NewDoctor, NewUser, Role};
use crate::store::{Storage, StoreError};

fn new_user(email: &str, pass: &str, first: &str, last: &str, role: Role) -> NewUser {
    NewUser {
        email: email.to_string(),
        password_hash: password::hash(pass),
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
        phone: None,
        date_of_birth: None,
        address: None,
        emergency_contact: None,
        emergency_phone: None,
        medical_history: None,
    }
}

pub fn seed_demo_data(store: &dyn Storage) -> Result<(), StoreError> {
    store.create_user(new_user(
        "admin@healthcare.com",
        "admin123",
        "Admin",
        "User",
        Role::Admin,
    ))?;

    let dr_sarah = store.create_user(new_user(
        "sarah.johnson@healthcare.com",
        "doctor123",
        "Sarah",
        "Johnson",
        Role::Doctor,
    ))?;
    let dr_michael = store.create_user(new_user(
        "michael.chen@healthcare.com",
        "doctor123",
        "Michael",
        "Chen",
        Role::Doctor,
    ))?;

    let patient = store.create_user(NewUser {
        phone: Some("+1 (555) 123-4567".to_string()),
        date_of_birth: Some("1990-05-15".to_string()),
        address: Some("123 Main Street, Cityville, State 12345".to_string()),
        emergency_contact: Some("Jane Doe".to_string()),
        emergency_phone: Some("+1 (555) 987-6543".to_string()),
        medical_history: Some("No known allergies. Taking daily vitamins.".to_string()),
        ..new_user("john.doe@email.com", "patient123", "John", "Doe", Role::Patient)
    })?;

    let cardiology = store.create_doctor(NewDoctor {
        user_id: dr_sarah.id,
        specialty: "Cardiology".to_string(),
        education: Some("Harvard Medical School".to_string()),
        experience: Some(15),
        rating: Some(49), // 4.9, tenths
        review_count: Some(127),
        is_available: Some(true),
        bio: Some(
            "Experienced cardiologist specializing in heart disease prevention and treatment."
                .to_string(),
        ),
    })?;
    store.create_doctor(NewDoctor {
        user_id: dr_michael.id,
        specialty: "Dermatology".to_string(),
        education: Some("Stanford Medical School".to_string()),
        experience: Some(12),
        rating: Some(47), // 4.7
        review_count: Some(89),
        is_available: Some(true),
        bio: Some(
            "Dermatology specialist with expertise in skin cancer detection and cosmetic procedures."
                .to_string(),
        ),
    })?;

    store.create_appointment(NewAppointment {
        patient_id: patient.id,
        doctor_id: cardiology.id,
        appointment_date: Utc::now() + Duration::hours(2),
        appointment_type: AppointmentType::Consultation,
        status: None,
        notes: Some("Regular checkup".to_string()),
    })?;

    tracing::info!("demo data seeded (admin@healthcare.com / admin123)");
    Ok(())
}
