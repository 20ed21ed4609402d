//! Buzzer Session Server
//!
//! A WebSocket daemon coordinating one real-time buzz-in session
//! between team clients and an admin client.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 BUZZER DAEMON (buzzer-daemon)                │
//! │             Single process, one shared session               │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  Session (Mutex) ── the only shared mutable state            │
//! │    ├─ ConnectionRegistry: id ──► role + outbound channel     │
//! │    └─ RoundState: locked flag + ordered buzz entries         │
//! │                                                              │
//! │  WebSocket server ──► ConnectionState per client             │
//! │    - register / buzz / admin_command routing                 │
//! │    - state_update broadcast after every accepted mutation    │
//! │    - transport keepalive (server-initiated ping)             │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol
//!
//! All messages are JSON over WebSocket:
//!
//! ```json
//! // Client -> Server
//! {"type": "register", "team_name": "Alpha"}
//! {"type": "register", "is_admin": true}
//! {"type": "buzz"}
//! {"type": "admin_command", "action": "unlock"}
//!
//! // Server -> Client
//! {"type": "registered", "client_id": "conn_1a2b3c4d", "role": "team", "team_name": "Alpha"}
//! {"type": "state_update", "locked": false, "buzz_order": [...], "teams": [...], ...}
//! {"type": "buzz_rejected", "reason": "locked"}
//! {"type": "error", "code": "not_admin", "message": "admin privileges required"}
//! ```

pub mod broadcast;
pub mod connection;
pub mod protocol;
pub mod registry;
pub mod round;
pub mod session;

pub use broadcast::{publish, snapshot};
pub use connection::{handle_connection, KeepaliveConfig};
pub use protocol::{BuzzRejectReason, ClientMessage, ServerMessage, StateSnapshot};
pub use registry::{ConnectionId, ConnectionRegistry, Role};
pub use round::{BuzzEntry, RoundState};
pub use session::Session;
