//! Error types and wire codes for quiz-buzzer

use thiserror::Error;

/// Main error type for session operations
///
/// Every variant is terminal to the single triggering operation only:
/// the offending client gets a private reply and the connection stays
/// open. Nothing here is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("team name must not be empty")]
    InvalidName,

    #[error("connection is already registered")]
    AlreadyRegistered,

    #[error("sender is not registered as a team")]
    NotATeam,

    #[error("admin privileges required")]
    NotAdmin,

    #[error("unknown admin action: {action}")]
    UnknownCommand { action: String },

    #[error("buzzers are locked")]
    BuzzLocked,

    #[error("team {team} has already buzzed this round")]
    AlreadyBuzzed { team: String },

    #[error("connection is gone")]
    ConnectionClosed,
}

impl SessionError {
    /// Stable code string carried in error replies to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::AlreadyRegistered => "already_registered",
            Self::NotATeam => "not_a_team",
            Self::NotAdmin => "not_admin",
            Self::UnknownCommand { .. } => "unknown_command",
            Self::BuzzLocked => "buzz_locked",
            Self::AlreadyBuzzed { .. } => "already_buzzed",
            Self::ConnectionClosed => "connection_closed",
        }
    }
}

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
