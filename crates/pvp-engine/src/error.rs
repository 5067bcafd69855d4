//! Engine errors
//!
//! Only programmer errors and lifecycle failures live here. A player acting
//! out of turn or without enough energy is not an error; see
//! [`crate::resolver::Rejection`].

use crate::catalog::Role;

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("unknown action id: {0}")]
    ActionNotFound(String),

    #[error("action {action} is not available to the {role} role")]
    ActionNotPermitted { action: &'static str, role: Role },

    #[error("a matchmaking request is already outstanding")]
    MatchmakingInProgress,

    #[error("matchmaking was cancelled")]
    MatchmakingCancelled,

    #[error("matchmaking timed out after {0:?}")]
    MatchmakingTimedOut(std::time::Duration),

    #[error("invalid match state: {reason}")]
    InvalidMatch { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error(transparent)]
    Config(#[from] serde_json::Error),
}
