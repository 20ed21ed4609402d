//! Wire protocol message types
//!
//! Defines the JSON message format for client-server communication.

use serde::{Deserialize, Serialize};

/// Client-to-server message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Claim a role on this connection (once, at connect time)
    Register {
        #[serde(default)]
        team_name: Option<String>,
        #[serde(default)]
        is_admin: bool,
    },
    /// Attempt to buzz in
    Buzz,
    /// Admin control of the round
    ///
    /// `action` is a free string so unrecognized actions get a proper
    /// `unknown_command` reply instead of a parse failure.
    AdminCommand { action: String },
    /// Ping to check connection
    Ping,
}

/// Server-to-client message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Registration confirmed (private to the new client)
    Registered {
        client_id: String,
        role: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        team_name: Option<String>,
    },
    /// Full session snapshot, broadcast after every accepted mutation
    StateUpdate(StateSnapshot),
    /// Buzz attempt denied (private to the sender)
    BuzzRejected { reason: BuzzRejectReason },
    /// Error response (private to the sender)
    Error { code: String, message: String },
    /// Pong response
    Pong,
}

/// Why a buzz attempt was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuzzRejectReason {
    Locked,
    AlreadyBuzzed,
}

/// One recorded buzz as shown to clients
///
/// `order_index` is authoritative for ranking; `buzzed_at` (RFC 3339)
/// is for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuzzEntryView {
    pub team_name: String,
    pub order_index: usize,
    pub buzzed_at: String,
}

/// Complete view of the current round plus roster
///
/// Clients are stateless consumers of this snapshot; they never
/// reconstruct state from diffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub locked: bool,
    pub buzz_order: Vec<BuzzEntryView>,
    pub teams: Vec<String>,
    pub team_count: usize,
    pub buzz_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_message_parse() {
        let json = r#"{"type":"register","team_name":"Alpha"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Register {
                team_name,
                is_admin,
            } => {
                assert_eq!(team_name.as_deref(), Some("Alpha"));
                assert!(!is_admin);
            }
            _ => panic!("Expected Register message"),
        }

        let json = r#"{"type":"register","is_admin":true}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Register {
                team_name,
                is_admin,
            } => {
                assert!(team_name.is_none());
                assert!(is_admin);
            }
            _ => panic!("Expected Register message"),
        }
    }

    #[test]
    fn test_buzz_and_admin_command_parse() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"buzz"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Buzz));

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"admin_command","action":"unlock"}"#).unwrap();
        match msg {
            ClientMessage::AdminCommand { action } => assert_eq!(action, "unlock"),
            _ => panic!("Expected AdminCommand message"),
        }
    }

    #[test]
    fn test_malformed_message_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"frobnicate"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn test_state_update_shape() {
        let msg = ServerMessage::StateUpdate(StateSnapshot {
            locked: false,
            buzz_order: vec![BuzzEntryView {
                team_name: "Alpha".to_string(),
                order_index: 0,
                buzzed_at: "2026-08-23T12:00:00+00:00".to_string(),
            }],
            teams: vec!["Alpha".to_string(), "Beta".to_string()],
            team_count: 2,
            buzz_count: 1,
        });

        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "state_update");
        assert_eq!(value["locked"], false);
        assert_eq!(value["buzz_order"][0]["team_name"], "Alpha");
        assert_eq!(value["buzz_order"][0]["order_index"], 0);
        assert_eq!(value["team_count"], 2);
        assert_eq!(value["buzz_count"], 1);
    }

    #[test]
    fn test_buzz_rejected_reason_encoding() {
        let msg = ServerMessage::BuzzRejected {
            reason: BuzzRejectReason::AlreadyBuzzed,
        };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "buzz_rejected");
        assert_eq!(value["reason"], "already_buzzed");
    }
}
