//! Quiz Buzzer: real-time buzz-in session coordinator
//!
//! This library coordinates one multi-party buzz-in session over
//! WebSocket: several team clients and one admin client share a
//! synchronized view of whether buzzing is currently allowed and which
//! team buzzed first.
//!
//! All mutations to the shared session state flow through a single
//! lock, so concurrent buzz presses are serialized and always resolve
//! to one deterministic winner, ranked by processing order rather than
//! wall-clock timestamps.
//!
//! The [`server`] module holds the whole daemon: the wire protocol, the
//! connection registry, the round state and arbitration, the snapshot
//! broadcaster, and the per-connection receive loop.

pub mod error;
pub mod server;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use server::{
    handle_connection, ClientMessage, ConnectionRegistry, KeepaliveConfig, Role, RoundState,
    ServerMessage, Session, StateSnapshot,
};
