//! Connection registry
//!
//! Owns the set of live connections and their identity/role metadata.
//! Roles are fixed by the first successful `register`; a connection is
//! removed on disconnect or when a broadcast send to it fails.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite::Message;

use crate::error::SessionError;

/// Opaque identity assigned to a connection at accept time.
pub type ConnectionId = String;

/// Role claimed by a connection via `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Unregistered,
    Team { name: String },
    Admin,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Unregistered => "unregistered",
            Role::Team { .. } => "team",
            Role::Admin => "admin",
        }
    }

    pub fn team_name(&self) -> Option<&str> {
        match self {
            Role::Team { name } => Some(name),
            _ => None,
        }
    }
}

/// One live connection: its role plus the outbound message channel.
#[derive(Debug)]
struct Peer {
    role: Role,
    tx: UnboundedSender<Message>,
}

/// Registry of all live connections.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    peers: HashMap<ConnectionId, Peer>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly accepted connection as unregistered.
    pub fn insert(&mut self, id: ConnectionId, tx: UnboundedSender<Message>) {
        self.peers.insert(
            id,
            Peer {
                role: Role::Unregistered,
                tx,
            },
        );
    }

    /// Fix a connection's role. Role and name never change afterwards.
    ///
    /// Team names must contain at least one non-whitespace character.
    /// Duplicate team names are accepted: a name identifies a team, so a
    /// refreshed browser tab rejoins as the same team. Multiple admins
    /// may coexist.
    pub fn register(&mut self, id: &str, role: Role) -> Result<(), SessionError> {
        if let Role::Team { name } = &role {
            if name.trim().is_empty() {
                return Err(SessionError::InvalidName);
            }
        }

        let peer = self
            .peers
            .get_mut(id)
            .ok_or(SessionError::ConnectionClosed)?;
        if peer.role != Role::Unregistered {
            return Err(SessionError::AlreadyRegistered);
        }
        peer.role = role;
        Ok(())
    }

    /// Idempotent removal.
    pub fn unregister(&mut self, id: &str) {
        self.peers.remove(id);
    }

    /// Snapshot of current (id, role) pairs. Safe to iterate while the
    /// registry mutates underneath.
    pub fn list(&self) -> Vec<(ConnectionId, Role)> {
        self.peers
            .iter()
            .map(|(id, peer)| (id.clone(), peer.role.clone()))
            .collect()
    }

    pub fn role_of(&self, id: &str) -> Option<Role> {
        self.peers.get(id).map(|peer| peer.role.clone())
    }

    pub fn is_admin(&self, id: &str) -> bool {
        matches!(self.role_of(id), Some(Role::Admin))
    }

    pub fn team_count(&self) -> usize {
        self.peers
            .values()
            .filter(|p| matches!(p.role, Role::Team { .. }))
            .count()
    }

    /// Names of currently connected teams, sorted for stable output.
    pub fn team_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .peers
            .values()
            .filter_map(|p| p.role.team_name().map(str::to_string))
            .collect();
        names.sort();
        names
    }

    pub fn contains(&self, id: &str) -> bool {
        self.peers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Queue a message for one connection. Returns false when the
    /// connection's receive loop is gone, which is how dead connections
    /// are discovered during a broadcast.
    pub fn send_to(&self, id: &str, msg: Message) -> bool {
        match self.peers.get(id) {
            Some(peer) => peer.tx.send(msg).is_ok(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn team(name: &str) -> Role {
        Role::Team {
            name: name.to_string(),
        }
    }

    fn registry_with(ids: &[&str]) -> (ConnectionRegistry, Vec<mpsc::UnboundedReceiver<Message>>) {
        let mut registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for id in ids {
            let (tx, rx) = mpsc::unbounded_channel();
            registry.insert(id.to_string(), tx);
            receivers.push(rx);
        }
        (registry, receivers)
    }

    #[test]
    fn test_register_team_and_admin() {
        let (mut registry, _rx) = registry_with(&["c1", "c2"]);

        registry.register("c1", team("Alpha")).unwrap();
        registry.register("c2", Role::Admin).unwrap();

        assert_eq!(registry.role_of("c1"), Some(team("Alpha")));
        assert!(registry.is_admin("c2"));
        assert_eq!(registry.team_count(), 1);
        assert_eq!(registry.team_names(), vec!["Alpha".to_string()]);
    }

    #[test]
    fn test_empty_or_whitespace_name_rejected() {
        let (mut registry, _rx) = registry_with(&["c1"]);

        assert_eq!(
            registry.register("c1", team("")),
            Err(SessionError::InvalidName)
        );
        assert_eq!(
            registry.register("c1", team("   \t")),
            Err(SessionError::InvalidName)
        );
        // A failed registration leaves the connection unregistered.
        assert_eq!(registry.role_of("c1"), Some(Role::Unregistered));
    }

    #[test]
    fn test_second_register_rejected() {
        let (mut registry, _rx) = registry_with(&["c1"]);

        registry.register("c1", team("Alpha")).unwrap();
        assert_eq!(
            registry.register("c1", team("Beta")),
            Err(SessionError::AlreadyRegistered)
        );
        assert_eq!(
            registry.register("c1", Role::Admin),
            Err(SessionError::AlreadyRegistered)
        );
        assert_eq!(registry.role_of("c1"), Some(team("Alpha")));
    }

    #[test]
    fn test_duplicate_team_names_accepted() {
        let (mut registry, _rx) = registry_with(&["c1", "c2"]);

        registry.register("c1", team("Alpha")).unwrap();
        registry.register("c2", team("Alpha")).unwrap();

        assert_eq!(registry.team_count(), 2);
    }

    #[test]
    fn test_multiple_admins_coexist() {
        let (mut registry, _rx) = registry_with(&["c1", "c2"]);

        registry.register("c1", Role::Admin).unwrap();
        registry.register("c2", Role::Admin).unwrap();

        assert!(registry.is_admin("c1"));
        assert!(registry.is_admin("c2"));
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let (mut registry, _rx) = registry_with(&["c1"]);

        registry.unregister("c1");
        registry.unregister("c1");
        registry.unregister("never-existed");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_on_gone_connection_fails() {
        let (mut registry, _rx) = registry_with(&[]);
        assert_eq!(
            registry.register("ghost", team("Alpha")),
            Err(SessionError::ConnectionClosed)
        );
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let (mut registry, _rx) = registry_with(&["c1"]);
        registry.register("c1", team("Alpha")).unwrap();

        let listed = registry.list();

        let (tx, _rx2) = mpsc::unbounded_channel();
        registry.insert("c2".to_string(), tx);

        assert_eq!(listed.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}
