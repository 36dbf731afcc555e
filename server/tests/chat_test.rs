//! Integration tests for the REST chat surface: send, history with the
//! read side effect, conversation aggregation, and offline delivery.

use std::net::SocketAddr;
use std::sync::Arc;

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

async fn send_message(base_url: &str, token: &str, receiver_id: &str, content: &str) {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/chat/messages", base_url))
        .bearer_auth(token)
        .json(&json!({ "receiverId": receiver_id, "content": content }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn offline_messages_surface_through_history() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let (patient_token, patient_id) =
        signup(&base_url, "john@example.com", "John", "Doe", "patient").await;
    let (doctor_token, doctor_id) =
        signup(&base_url, "sarah@example.com", "Sarah", "Johnson", "doctor").await;

    // The doctor has no live connection; every send is a plain persist.
    for content in ["first", "second", "third"] {
        send_message(&base_url, &patient_token, &doctor_id, content).await;
    }

    let resp = client
        .get(format!("{}/api/chat/messages/{}", base_url, patient_id))
        .bearer_auth(&doctor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let history: Vec<serde_json::Value> = resp.json().await.unwrap();
    let contents: Vec<&str> = history
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
    // Server-assigned ids are unique; clients de-duplicate on them
    assert_ne!(history[0]["id"], history[1]["id"]);
}

#[tokio::test]
async fn history_fetch_marks_read_and_zeroes_unread_count() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let (patient_token, patient_id) =
        signup(&base_url, "john@example.com", "John", "Doe", "patient").await;
    let (doctor_token, doctor_id) =
        signup(&base_url, "sarah@example.com", "Sarah", "Johnson", "doctor").await;

    send_message(&base_url, &patient_token, &doctor_id, "are you there?").await;
    send_message(&base_url, &patient_token, &doctor_id, "hello?").await;

    // Aggregation alone never flips read state: two calls, same answer
    for _ in 0..2 {
        let resp = client
            .get(format!("{}/api/chat/conversations", base_url))
            .bearer_auth(&doctor_token)
            .send()
            .await
            .unwrap();
        let rows: Vec<serde_json::Value> = resp.json().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["userId"].as_str().unwrap(), patient_id);
        assert_eq!(rows[0]["userName"].as_str().unwrap(), "John Doe");
        assert_eq!(rows[0]["lastMessage"].as_str().unwrap(), "hello?");
        assert_eq!(rows[0]["unreadCount"].as_u64().unwrap(), 2);
    }

    // Opening the conversation is what marks it read
    let resp = client
        .get(format!("{}/api/chat/messages/{}", base_url, patient_id))
        .bearer_auth(&doctor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .get(format!("{}/api/chat/conversations", base_url))
        .bearer_auth(&doctor_token)
        .send()
        .await
        .unwrap();
    let rows: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(rows[0]["unreadCount"].as_u64().unwrap(), 0);

    // The sender's own unread count toward the doctor was never affected
    let resp = client
        .get(format!("{}/api/chat/conversations", base_url))
        .bearer_auth(&patient_token)
        .send()
        .await
        .unwrap();
    let rows: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(rows[0]["unreadCount"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let (base_url, _) = start_test_server().await;
    let (patient_token, _) =
        signup(&base_url, "john@example.com", "John", "Doe", "patient").await;
    let (_, doctor_id) = signup(&base_url, "sarah@example.com", "S", "J", "doctor").await;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/chat/messages", base_url))
        .bearer_auth(&patient_token)
        .json(&json!({ "receiverId": doctor_id, "content": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}
