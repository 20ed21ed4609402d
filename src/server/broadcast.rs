//! Snapshot building and fan-out
//!
//! Serializes the current round plus roster into one `state_update`
//! message and queues it for every live connection. Connections whose
//! outbound channel is gone are pruned from the registry here; this is
//! the only disconnect detection beyond the transport keepalive.

use tokio_tungstenite::tungstenite::Message;

use crate::server::protocol::{BuzzEntryView, ServerMessage, StateSnapshot};
use crate::server::registry::ConnectionRegistry;
use crate::server::round::RoundState;

/// Build the `state_update` payload for the current state.
pub fn snapshot(registry: &ConnectionRegistry, round: &RoundState) -> StateSnapshot {
    let buzz_order: Vec<BuzzEntryView> = round
        .entries()
        .iter()
        .map(|e| BuzzEntryView {
            team_name: e.team_name.clone(),
            order_index: e.order_index,
            buzzed_at: e.buzzed_at.to_rfc3339(),
        })
        .collect();
    StateSnapshot {
        locked: round.locked(),
        buzz_count: buzz_order.len(),
        buzz_order,
        team_count: registry.team_count(),
        teams: registry.team_names(),
    }
}

/// Send the current snapshot to every connection in the registry.
///
/// Any connection whose send fails is removed before this returns, so
/// every connection still present afterwards has the new snapshot
/// queued.
pub fn publish(registry: &mut ConnectionRegistry, round: &RoundState) {
    let msg = ServerMessage::StateUpdate(snapshot(registry, round));
    let text = match serde_json::to_string(&msg) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("failed to serialize state snapshot: {}", e);
            return;
        }
    };

    let mut dead = Vec::new();
    for (id, _) in registry.list() {
        if !registry.send_to(&id, Message::Text(text.clone())) {
            dead.push(id);
        }
    }

    for id in dead {
        tracing::info!("pruning unreachable connection {}", id);
        registry.unregister(&id);
    }
}
