//! Router assembly: route groups, auth rate limiting, and the JWT
//! secret injection middleware.

use axum::{middleware, routing, Router};
use std::sync::Arc;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::handlers as auth_handlers;
use crate::auth::middleware::JwtSecret;
use crate::state::AppState;
use crate::ws::handler as ws_handler;
use crate::{admin, appointments, chat, doctors, profile};

/// Inject the JWT secret into request extensions so the Claims
/// extractor can find it.
async fn inject_jwt_secret(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    req.extensions_mut()
        .insert(JwtSecret(state.jwt_secret.clone()));
    next.run(req).await
}

/// Build the full axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    // Rate limiting: 5 requests per minute per IP on auth endpoints.
    // PeerIpKeyExtractor reads from ConnectInfo<SocketAddr>.
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(12) // 1 token every 12 seconds = 5 per minute
            .burst_size(5)
            .finish()
            .expect("Failed to build governor config"),
    );
    let governor_limiter = governor_config.limiter().clone();

    // Background task to clean up rate limiter state
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            governor_limiter.retain_recent();
        }
    });

    let auth_routes = Router::new()
        .route("/api/auth/login", routing::post(auth_handlers::login))
        .route("/api/auth/signup", routing::post(auth_handlers::signup))
        .layer(GovernorLayer {
            config: governor_config,
        });

    // Roster listing is public; create/delete require an admin token via
    // the Claims extractor. Same path, so registered together.
    let api_routes = Router::new()
        .route("/api/auth/me", routing::get(auth_handlers::me))
        .route(
            "/api/doctors",
            routing::get(doctors::list_doctors).post(doctors::create_doctor),
        )
        .route("/api/doctors/{id}", routing::delete(doctors::delete_doctor))
        .route(
            "/api/appointments",
            routing::get(appointments::list_appointments)
                .post(appointments::create_appointment),
        )
        .route(
            "/api/appointments/today",
            routing::get(appointments::today_appointments),
        )
        .route(
            "/api/chat/conversations",
            routing::get(chat::handlers::conversations),
        )
        .route(
            "/api/chat/messages/{userId}",
            routing::get(chat::handlers::history),
        )
        .route(
            "/api/chat/messages",
            routing::post(chat::handlers::send_message),
        )
        .route("/api/profile", routing::put(profile::update_profile))
        .route("/api/admin/stats", routing::get(admin::stats));

    // WebSocket endpoint; auth happens in-protocol via the auth frame
    let ws_routes = Router::new().route("/ws", routing::get(ws_handler::ws_upgrade));

    let health = Router::new().route("/health", routing::get(health_check));

    Router::new()
        .merge(auth_routes)
        .merge(api_routes)
        .merge(ws_routes)
        .merge(health)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            inject_jwt_secret,
        ))
        .with_state(state)
}

/// Basic health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
