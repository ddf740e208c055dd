//! Fixtures shared by the cross-crate tests.

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;

use passgate_core::{RawResultPayload, VerifierConfig};
use passgate_disclosure::{CapabilityEvent, ProofCapability};
use passgate_eligibility::ResultExtractor;
use passgate_session::{SessionUpdate, VerificationSession};

/// Reference date every fixture session computes ages against.
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

/// Wrap a value the way the capability reports disclosed attributes.
pub fn disclosed(value: Value) -> Value {
    json!({ "disclose": { "result": value } })
}

pub fn result_event(verified: bool, payload: Value) -> CapabilityEvent {
    CapabilityEvent::Result {
        verified,
        result: RawResultPayload::new(payload),
    }
}

/// Device progress up to a generated proof.
pub fn device_progress() -> Vec<CapabilityEvent> {
    vec![
        CapabilityEvent::RequestReceived,
        CapabilityEvent::GeneratingProof,
        CapabilityEvent::ProofGenerated {
            name: "disclosure-proof".into(),
        },
    ]
}

/// Session over `capability` with default config and a fixed reference date.
pub fn session_with(capability: Arc<dyn ProofCapability>) -> VerificationSession {
    VerificationSession::new(capability, &VerifierConfig::default())
        .with_extractor(ResultExtractor::at(reference_date()))
}

/// Everything published so far.
pub fn drain_updates(rx: &mut broadcast::Receiver<SessionUpdate>) -> Vec<SessionUpdate> {
    let mut updates = Vec::new();
    while let Ok(update) = rx.try_recv() {
        updates.push(update);
    }
    updates
}
