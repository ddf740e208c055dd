//! Lifecycle events pushed by the proof capability once a request is finalized.
//!
//! Device events arrive in order received → generating proof → proof generated,
//! followed by exactly one of result, reject, or error. Consumers must treat the
//! last three as terminal and mutually exclusive.

use passgate_core::RawResultPayload;
use serde::{Deserialize, Serialize};

/// Events emitted by the proof capability for a single request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CapabilityEvent {
    /// The holder's device picked up the request.
    RequestReceived,

    /// The device started generating the proof.
    GeneratingProof,

    /// The device finished generating the proof.
    ProofGenerated {
        /// Informational proof name reported by the device.
        name: String,
    },

    /// The capability finished verifying the proof.
    Result {
        /// Whether the proof itself verified.
        verified: bool,
        /// Disclosed attributes.
        result: RawResultPayload,
    },

    /// The holder rejected or cancelled the request.
    Reject,

    /// The capability failed.
    Error {
        /// Human-readable failure detail.
        detail: String,
    },
}

impl CapabilityEvent {
    /// Whether this event ends the request.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Result { .. } | Self::Reject | Self::Error { .. }
        )
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RequestReceived => "request_received",
            Self::GeneratingProof => "generating_proof",
            Self::ProofGenerated { .. } => "proof_generated",
            Self::Result { .. } => "result",
            Self::Reject => "reject",
            Self::Error { .. } => "error",
        }
    }
}
