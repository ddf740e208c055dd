use std::fmt;

use crate::error::CoreError;

/// The states of one verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SessionState {
    /// Nothing in progress.
    Idle,
    /// Waiting for the requester to type the expected first name.
    AwaitingInput,
    /// Resolving attribute keys and creating the request.
    BuildingRequest,
    /// QR code displayed, waiting for the holder's device.
    AwaitingScan,
    /// The holder's device picked up the request.
    RequestReceived,
    /// The device is generating the proof.
    GeneratingProof,
    /// The device finished generating the proof.
    ProofGenerated,
    /// Waiting for the capability to report the verified result.
    AwaitingResult,
    /// Every requested attribute verified. Final state.
    Succeeded,
    /// Age and name requested, only one verified. Final state.
    PartiallyVerified,
    /// Proof invalid or attributes ineligible. Final state.
    Failed,
    /// The holder cancelled on their device. Final state.
    Rejected,
    /// A technical failure ended the attempt. Final state.
    Errored,
}

impl SessionState {
    /// Whether this is a final (terminal) state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::PartiallyVerified | Self::Failed | Self::Rejected | Self::Errored
        )
    }

    /// Whether a verification attempt is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle) && !self.is_terminal()
    }

    /// Position along the device-driven part of the flow, if in it.
    fn waiting_rank(&self) -> Option<u8> {
        match self {
            Self::AwaitingScan => Some(0),
            Self::RequestReceived => Some(1),
            Self::GeneratingProof => Some(2),
            Self::ProofGenerated => Some(3),
            Self::AwaitingResult => Some(4),
            _ => None,
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::AwaitingInput => write!(f, "AwaitingInput"),
            Self::BuildingRequest => write!(f, "BuildingRequest"),
            Self::AwaitingScan => write!(f, "AwaitingScan"),
            Self::RequestReceived => write!(f, "RequestReceived"),
            Self::GeneratingProof => write!(f, "GeneratingProof"),
            Self::ProofGenerated => write!(f, "ProofGenerated"),
            Self::AwaitingResult => write!(f, "AwaitingResult"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::PartiallyVerified => write!(f, "PartiallyVerified"),
            Self::Failed => write!(f, "Failed"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Errored => write!(f, "Errored"),
        }
    }
}

/// Events that trigger session state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user starts a verification.
    Start { requires_name: bool },
    /// A valid expected name was submitted.
    NameAccepted,
    /// The request was built, its URL received, and the QR code displayed.
    RequestReady,
    /// The device reports it received the request.
    RequestReceived,
    /// The device reports it is generating the proof.
    GeneratingProof,
    /// The device reports the proof is generated.
    ProofGenerated,
    /// Hand over to waiting for the capability's verdict.
    AwaitResult,
    /// Verified proof, every attribute eligible.
    Succeed,
    /// Verified proof, only part of a combined request eligible.
    PartiallyVerify,
    /// Unverified proof or ineligible attributes.
    Fail,
    /// The holder rejected the request.
    Reject,
    /// The capability or a build step failed.
    Error,
    /// Return to idle, discarding the attempt.
    Reset,
}

impl SessionEvent {
    fn target(&self) -> SessionState {
        match self {
            Self::Start { requires_name: true } => SessionState::AwaitingInput,
            Self::Start { requires_name: false } => SessionState::BuildingRequest,
            Self::NameAccepted => SessionState::BuildingRequest,
            Self::RequestReady => SessionState::AwaitingScan,
            Self::RequestReceived => SessionState::RequestReceived,
            Self::GeneratingProof => SessionState::GeneratingProof,
            Self::ProofGenerated => SessionState::ProofGenerated,
            Self::AwaitResult => SessionState::AwaitingResult,
            Self::Succeed => SessionState::Succeeded,
            Self::PartiallyVerify => SessionState::PartiallyVerified,
            Self::Fail => SessionState::Failed,
            Self::Reject => SessionState::Rejected,
            Self::Error => SessionState::Errored,
            Self::Reset => SessionState::Idle,
        }
    }
}

/// Manages session state transitions.
///
/// Valid transitions:
/// - Idle → AwaitingInput | BuildingRequest (Start)
/// - AwaitingInput → BuildingRequest (NameAccepted)
/// - BuildingRequest → AwaitingScan (RequestReady)
/// - AwaitingScan → RequestReceived → GeneratingProof → ProofGenerated, forward only,
///   skipping allowed (device events)
/// - ProofGenerated → AwaitingResult (AwaitResult)
/// - AwaitingScan..=AwaitingResult → Succeeded | PartiallyVerified | Failed
/// - any active state → Rejected | Errored
/// - any state → Idle (Reset)
pub struct SessionStateMachine;

impl SessionStateMachine {
    /// Attempt a state transition based on an event.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: SessionState,
        event: SessionEvent,
    ) -> Result<SessionState, CoreError> {
        use SessionState as S;

        let target = event.target();
        let valid = match event {
            SessionEvent::Start { .. } => current == S::Idle,
            SessionEvent::NameAccepted => current == S::AwaitingInput,
            SessionEvent::RequestReady => current == S::BuildingRequest,
            SessionEvent::RequestReceived
            | SessionEvent::GeneratingProof
            | SessionEvent::ProofGenerated => {
                match (current.waiting_rank(), target.waiting_rank()) {
                    (Some(from), Some(to)) => to > from,
                    _ => false,
                }
            }
            SessionEvent::AwaitResult => current == S::ProofGenerated,
            SessionEvent::Succeed | SessionEvent::PartiallyVerify | SessionEvent::Fail => {
                current.waiting_rank().is_some()
            }
            SessionEvent::Reject | SessionEvent::Error => current.is_active(),
            SessionEvent::Reset => true,
        };

        if !valid {
            return Err(CoreError::InvalidStateTransition {
                from: current,
                to: target,
            });
        }

        tracing::debug!(
            from = %current,
            to = %target,
            event = ?event,
            "session state transition"
        );

        Ok(target)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: SessionState, event: SessionEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
