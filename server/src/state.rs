use crate::store::SharedStorage;
use crate::ws::ConnectionRegistry;

/// Shared application state passed to all handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Entity store behind a trait object so a durable backend can be
    /// swapped in without touching callers. Tests inject their own.
    pub store: SharedStorage,
    /// Active WebSocket connections per user
    pub connections: ConnectionRegistry,
    /// JWT signing secret (256-bit random key unless configured)
    pub jwt_secret: Vec<u8>,
    /// Session token lifetime in hours
    pub token_ttl_hours: i64,
}
