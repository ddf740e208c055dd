//! Updates published to the UI boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

use passgate_core::SessionState;

use crate::outcome::VerificationOutcome;

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The `(state, message, severity)` triple published on every state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub state: SessionState,
    pub message: String,
    pub severity: Severity,
}

/// Everything a session publishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    Status(StatusUpdate),
    /// Sent once per attempt, right after the terminal status.
    Outcome(VerificationOutcome),
}

pub(crate) const PAUSED_MESSAGE: &str = "Verification paused. Return to this tab to continue.";

/// Message and severity for a non-terminal state.
pub(crate) fn progress_status(state: SessionState) -> (&'static str, Severity) {
    match state {
        SessionState::Idle => ("", Severity::Info),
        SessionState::AwaitingInput => (
            "Please enter your first name to verify against your passport",
            Severity::Info,
        ),
        SessionState::BuildingRequest => ("Initializing verification request...", Severity::Info),
        SessionState::AwaitingScan => (
            "Scan the QR code with your passport app",
            Severity::Success,
        ),
        SessionState::RequestReceived => ("Request received on your device", Severity::Info),
        SessionState::GeneratingProof => (
            "Generating zero-knowledge proof on your device...",
            Severity::Info,
        ),
        SessionState::ProofGenerated => (
            "Zero-knowledge proof generated successfully",
            Severity::Success,
        ),
        SessionState::AwaitingResult => ("Verifying proof...", Severity::Info),
        SessionState::Succeeded => ("Verification successful", Severity::Success),
        SessionState::PartiallyVerified => ("Partial verification", Severity::Warning),
        SessionState::Failed => ("Verification failed", Severity::Error),
        SessionState::Rejected => (
            "Verification was rejected or cancelled by user.",
            Severity::Warning,
        ),
        SessionState::Errored => ("Verification error", Severity::Error),
    }
}
