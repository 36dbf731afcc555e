//! Realtime layer: connection registry, per-connection actor, and the
//! JSON frame protocol.

pub mod actor;
pub mod broadcast;
pub mod handler;
pub mod protocol;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Sender half of a WebSocket connection's channel. Any part of the
/// system can clone this to push frames to a specific client.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Connection registry: all active WebSocket connections per user.
/// Set-valued: a user may be connected from several tabs or devices at
/// once, and delivery fans out to all of them.
pub type ConnectionRegistry = Arc<DashMap<Uuid, Vec<ConnectionSender>>>;

pub fn new_connection_registry() -> ConnectionRegistry {
    Arc::new(DashMap::new())
}

/// Add a connection for a user. Earlier registrations for the same user
/// are kept; this is an append, not a replacement.
pub fn register(registry: &ConnectionRegistry, user_id: Uuid, tx: ConnectionSender) {
    registry.entry(user_id).or_default().push(tx);
}

/// Remove one connection by channel identity. Matching on the channel
/// rather than the user id means a newer registration for the same user
/// is never removed by a stale connection's teardown.
pub fn unregister(registry: &ConnectionRegistry, user_id: Uuid, tx: &ConnectionSender) {
    if let Some(mut senders) = registry.get_mut(&user_id) {
        senders.retain(|s| !s.same_channel(tx));
        if senders.is_empty() {
            drop(senders);
            registry.remove_if(&user_id, |_, v| v.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_appends_and_unregister_matches_by_channel() {
        let registry = new_connection_registry();
        let user = Uuid::now_v7();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        register(&registry, user, tx1.clone());
        register(&registry, user, tx2.clone());
        assert_eq!(registry.get(&user).unwrap().len(), 2);

        // Tearing down the first connection leaves the second intact.
        unregister(&registry, user, &tx1);
        let remaining = registry.get(&user).unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].same_channel(&tx2));
        drop(remaining);

        unregister(&registry, user, &tx2);
        assert!(registry.get(&user).is_none());
    }
}
