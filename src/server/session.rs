//! Shared session context
//!
//! The single context object behind the coordinator: the connection
//! registry and the round state live behind one mutex. Every mutating
//! operation locks, applies, and broadcasts before unlocking, so no two
//! read-modify-write sequences ever interleave. That serialization is
//! what makes buzz arbitration deterministic under concurrent arrivals.

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;

use crate::error::SessionError;
use crate::server::broadcast;
use crate::server::protocol::StateSnapshot;
use crate::server::registry::{ConnectionId, ConnectionRegistry, Role};
use crate::server::round::RoundState;

#[derive(Default)]
struct SessionInner {
    registry: ConnectionRegistry,
    round: RoundState,
}

/// Process-wide session state. One instance per daemon, shared across
/// connection tasks via `Arc`.
#[derive(Default)]
pub struct Session {
    inner: Mutex<SessionInner>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly accepted connection and hand back its id.
    pub fn connect(&self, tx: UnboundedSender<Message>) -> ConnectionId {
        let id = format!(
            "conn_{}",
            uuid::Uuid::new_v4().to_string().split('-').next().unwrap()
        );
        let mut guard = self.inner.lock();
        guard.registry.insert(id.clone(), tx);
        tracing::debug!("connection {} accepted", id);
        id
    }

    /// Apply a `register` message. Broadcasts the new roster on success;
    /// failures are private to the caller and change nothing.
    pub fn register(
        &self,
        id: &str,
        team_name: Option<String>,
        is_admin: bool,
    ) -> Result<Role, SessionError> {
        let role = if is_admin {
            Role::Admin
        } else {
            Role::Team {
                name: team_name.unwrap_or_default(),
            }
        };

        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        inner.registry.register(id, role.clone())?;
        match &role {
            Role::Admin => tracing::info!("admin client registered: {}", id),
            Role::Team { name } => tracing::info!("team registered: {} ({})", name, id),
            Role::Unregistered => {}
        }
        broadcast::publish(&mut inner.registry, &inner.round);
        Ok(role)
    }

    /// Apply a buzz attempt for the team registered on `id`.
    ///
    /// Broadcasts only when the buzz is accepted; a rejection changes no
    /// shared state, so the rest of the session never hears about it.
    pub fn buzz(&self, id: &str) -> Result<usize, SessionError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let team = match inner.registry.role_of(id) {
            Some(Role::Team { name }) => name,
            _ => return Err(SessionError::NotATeam),
        };

        let order_index = inner.round.attempt_buzz(&team)?;
        tracing::info!("buzz from {} accepted at index {}", team, order_index);
        broadcast::publish(&mut inner.registry, &inner.round);
        Ok(order_index)
    }

    /// Apply an admin command (`lock`, `unlock`, `reset`).
    ///
    /// Recognized commands always broadcast, even when idempotent, so
    /// clients converge on the latest snapshot.
    pub fn admin_command(&self, id: &str, action: &str) -> Result<(), SessionError> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        if !inner.registry.is_admin(id) {
            tracing::warn!("non-admin connection {} attempted admin command", id);
            return Err(SessionError::NotAdmin);
        }

        match action {
            "lock" => inner.round.lock(),
            "unlock" => inner.round.unlock(),
            "reset" => inner.round.reset(),
            other => {
                tracing::warn!("unknown admin action: {}", other);
                return Err(SessionError::UnknownCommand {
                    action: other.to_string(),
                });
            }
        }

        tracing::info!("admin command applied: {}", action);
        broadcast::publish(&mut inner.registry, &inner.round);
        Ok(())
    }

    /// Remove a connection and tell everyone else the roster changed.
    ///
    /// Buzz entries key on team name, not connection identity, so a
    /// disconnecting team keeps its place in the buzz order.
    pub fn disconnect(&self, id: &str) {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        match inner.registry.role_of(id) {
            Some(Role::Team { name }) => tracing::info!("team disconnected: {} ({})", name, id),
            Some(Role::Admin) => tracing::info!("admin client disconnected: {}", id),
            Some(Role::Unregistered) => tracing::debug!("connection {} closed", id),
            None => return,
        }

        inner.registry.unregister(id);
        broadcast::publish(&mut inner.registry, &inner.round);
    }

    /// Read-only view of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        let guard = self.inner.lock();
        broadcast::snapshot(&guard.registry, &guard.round)
    }
}
