//! Fan-out of server frames to registered connections.

use uuid::Uuid;

use super::protocol::ServerFrame;
use super::ConnectionRegistry;

/// Send a frame to every live connection of one user. A user with no
/// registered connections is simply skipped; undelivered messages stay
/// in the store and surface through a later history fetch.
pub fn send_to_user(registry: &ConnectionRegistry, user_id: Uuid, frame: &ServerFrame) {
    let msg = frame.to_ws_message();
    if let Some(connections) = registry.get(&user_id) {
        for sender in connections.value().iter() {
            let _ = sender.send(msg.clone());
        }
    }
}
