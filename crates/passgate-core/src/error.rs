use crate::session_state::SessionState;

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: SessionState, to: SessionState },

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("unknown verification kind: {0}")]
    UnknownKind(String),

    #[error("config error: {0}")]
    Config(String),
}
