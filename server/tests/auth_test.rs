//! Integration tests for signup/login/me and the token error taxonomy.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;

use medilink_server::store::memory::MemStorage;

/// Helper: start the server on a random port and return the base URL.
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

fn signup_body(email: &str, role: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "secret123",
        "firstName": "Jane",
        "lastName": "Doe",
        "role": role,
    })
}

#[tokio::test]
async fn signup_then_login_yields_matching_identity() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&signup_body("jane@example.com", "patient"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let signup: serde_json::Value = resp.json().await.unwrap();
    let user_id = signup["user"]["id"].as_str().unwrap().to_string();
    assert!(signup["token"].as_str().is_some());
    // Password hash never leaves the server
    assert!(signup["user"].get("password").is_none());
    assert!(signup["user"].get("passwordHash").is_none());

    let resp = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({
            "email": "jane@example.com",
            "password": "secret123",
            "role": "patient",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let login: serde_json::Value = resp.json().await.unwrap();
    let token = login["token"].as_str().unwrap();

    // The token resolves to the same user via /me
    let resp = client
        .get(format!("{}/api/auth/me", base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let me: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(me["user"]["id"].as_str().unwrap(), user_id);
    assert_eq!(me["user"]["role"].as_str().unwrap(), "patient");
}

#[tokio::test]
async fn duplicate_email_signup_rejected() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let first = client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&signup_body("dup@example.com", "patient"))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);

    let second = client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&signup_body("dup@example.com", "doctor"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 400);
}

#[tokio::test]
async fn wrong_password_or_role_is_unauthorized() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&signup_body("jane@example.com", "patient"))
        .send()
        .await
        .unwrap();

    let bad_password = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({
            "email": "jane@example.com",
            "password": "wrong-password",
            "role": "patient",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_password.status(), 401);

    // Right credentials, wrong portal role: same rejection
    let bad_role = client
        .post(format!("{}/api/auth/login", base_url))
        .json(&json!({
            "email": "jane@example.com",
            "password": "secret123",
            "role": "doctor",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad_role.status(), 401);
}

#[tokio::test]
async fn profile_update_changes_only_what_the_payload_names() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/auth/signup", base_url))
        .json(&signup_body("jane@example.com", "patient"))
        .send()
        .await
        .unwrap();
    let signup: serde_json::Value = resp.json().await.unwrap();
    let token = signup["token"].as_str().unwrap().to_string();

    let resp = client
        .put(format!("{}/api/profile", base_url))
        .bearer_auth(&token)
        .json(&json!({ "phone": "555-0100", "address": "12 Elm St" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let updated: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(updated["user"]["phone"].as_str().unwrap(), "555-0100");
    assert_eq!(updated["user"]["address"].as_str().unwrap(), "12 Elm St");
    // Untouched fields survive the partial update
    assert_eq!(updated["user"]["firstName"].as_str().unwrap(), "Jane");
    assert_eq!(
        updated["user"]["email"].as_str().unwrap(),
        "jane@example.com"
    );
    assert_eq!(updated["user"]["role"].as_str().unwrap(), "patient");
}

#[tokio::test]
async fn missing_token_401_invalid_token_403() {
    let (base_url, _) = start_test_server().await;
    let client = reqwest::Client::new();

    let no_token = client
        .get(format!("{}/api/auth/me", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(no_token.status(), 401);

    let garbage = client
        .get(format!("{}/api/auth/me", base_url))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(garbage.status(), 403);
}
