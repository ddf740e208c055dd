//! Passgate Core: fundamental types, errors, and configuration for
//! selective-disclosure identity verification.

pub mod config;
pub mod error;
pub mod session_state;
pub mod types;

pub use config::VerifierConfig;
pub use error::CoreError;
pub use session_state::{SessionEvent, SessionState, SessionStateMachine};
pub use types::{
    AttributeKey, DisclosureSpec, LogicalAttribute, RawResultPayload, RequestMetadata,
    VerificationKind,
};
