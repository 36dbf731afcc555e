//! Integration tests for the admin stats endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tokio::net::TcpListener;

use medilink_server::store::memory::MemStorage;

async fn start_test_server() -> (String, SocketAddr) {
    let state = medilink_server::state::AppState {
        store: Arc::new(MemStorage::new()),
        connections: medilink_server::ws::new_connection_registry(),
        jwt_secret: medilink_server::auth::jwt::generate_jwt_secret(),
        token_ttl_hours: 24,
    };
    let app = medilink_server::routes::build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{}", addr), addr)
}

async fn signup(
    base_url: &str,
    email: &str,
    first: &str,
    last: &str,
    role: &str,
) -> (String, String) {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/auth/signup", base_url))
        .json(&json!({
            "email": email,
            "password": "secret123",
            "firstName": first,
            "lastName": last,
            "role": role,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn stats_count_doctors_patients_and_todays_appointments() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let (admin_token, _) = signup(&base_url, "admin@example.com", "Ada", "Root", "admin").await;
    let (_, doctor_user_id) = signup(&base_url, "d@example.com", "Dana", "Scully", "doctor").await;
    let (_, patient_id) = signup(&base_url, "p@example.com", "Pat", "Ient", "patient").await;

    let resp = client
        .post(format!("{}/api/doctors", base_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "userId": doctor_user_id, "specialty": "Radiology" }))
        .send()
        .await
        .unwrap();
    let doctor: serde_json::Value = resp.json().await.unwrap();
    let doctor_id = doctor["id"].as_str().unwrap().to_string();

    // One appointment in a few seconds (today), one next week. Admins
    // book on behalf of the named patient.
    for (offset, label) in [
        (Duration::seconds(30), "today"),
        (Duration::days(7), "next week"),
    ] {
        let resp = client
            .post(format!("{}/api/appointments", base_url))
            .bearer_auth(&admin_token)
            .json(&json!({
                "patientId": patient_id,
                "doctorId": doctor_id,
                "appointmentDate": Utc::now() + offset,
                "appointmentType": "checkup",
                "notes": label,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = client
        .get(format!("{}/api/admin/stats", base_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let stats: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(stats["totalDoctors"].as_u64().unwrap(), 1);
    assert_eq!(stats["totalPatients"].as_u64().unwrap(), 1);
    assert_eq!(stats["todayAppointments"].as_u64().unwrap(), 1);

    // Non-admins are shut out
    let (patient_token, _) = signup(&base_url, "p2@example.com", "Other", "Pat", "patient").await;
    let resp = client
        .get(format!("{}/api/admin/stats", base_url))
        .bearer_auth(&patient_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}
