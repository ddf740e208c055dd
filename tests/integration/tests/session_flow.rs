//! Integration test: full verification sessions across crates.
//!
//! Drives passgate-session against the in-memory capability from
//! passgate-disclosure and checks the verdicts passgate-eligibility reaches.

use serde_json::json;
use std::sync::Arc;

use passgate_core::{SessionState, VerificationKind, VerifierConfig};
use passgate_disclosure::{CapabilityEvent, InMemoryCapability};
use passgate_eligibility::VerdictLabel;
use passgate_integration_tests::{
    device_progress, disclosed, drain_updates, result_event, session_with,
};
use passgate_session::{IssuerHandoff, SessionUpdate, VerificationSession};

fn scripted(result: CapabilityEvent) -> Arc<InMemoryCapability> {
    let mut script = device_progress();
    script.push(result);
    Arc::new(InMemoryCapability::new().with_script(script))
}

// =========================================================================
// Age and name together
// =========================================================================

#[tokio::test]
async fn test_age_and_name_end_to_end_success() {
    let capability = scripted(result_event(
        true,
        json!({
            "age": disclosed(json!(30)),
            "firstname": disclosed(json!("ANA")),
        }),
    ));
    let mut session = session_with(capability.clone());
    let mut rx = session.subscribe();

    assert_eq!(
        session.start(VerificationKind::AgeAndName).await.unwrap(),
        SessionState::AwaitingInput
    );
    assert_eq!(
        session.submit_name(" Ana ").await.unwrap(),
        SessionState::AwaitingScan
    );

    let metadata = capability.last_metadata().expect("request should be created");
    assert_eq!(metadata.scope, "identity-verification");
    assert_eq!(metadata.display_name, "Identity Verifier");
    assert!(!metadata.dev_mode);

    let spec = session.disclosure_spec().expect("spec should be set");
    assert_eq!(spec.keys().len(), 2);
    assert!(spec.contains("age"));
    assert!(spec.contains("firstname"));

    let outcome = session.run_to_completion().await.unwrap();
    assert!(outcome.success);
    assert!(!outcome.partial);
    assert_eq!(outcome.state, SessionState::Succeeded);
    assert_eq!(outcome.label, Some(VerdictLabel::FullyVerified));
    assert_eq!(outcome.age_years, Some(30));
    assert!(outcome.message.contains("\"Ana\""));

    let updates = drain_updates(&mut rx);
    let states: Vec<SessionState> = updates
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::Status(s) => Some(s.state),
            SessionUpdate::Outcome(_) => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![
            SessionState::AwaitingInput,
            SessionState::BuildingRequest,
            SessionState::AwaitingScan,
            SessionState::RequestReceived,
            SessionState::GeneratingProof,
            SessionState::ProofGenerated,
            SessionState::AwaitingResult,
            SessionState::Succeeded,
        ]
    );
    assert!(matches!(updates.last(), Some(SessionUpdate::Outcome(o)) if o == &outcome));

    let handoff = IssuerHandoff::from_outcome(&outcome).expect("success yields a hand-off");
    let params = handoff.params();
    assert!(params.contains(&("verified_age".into(), "true".into())));
    assert!(params.contains(&("verified_name".into(), "ANA".into())));
    assert!(params.iter().any(|(k, _)| k == "verification_timestamp"));
}

#[tokio::test]
async fn test_age_and_name_partial_yields_partial_handoff() {
    let capability = scripted(result_event(
        true,
        json!({ "age": disclosed(json!(16)), "firstname": disclosed(json!("Ana")) }),
    ));
    let mut session = session_with(capability);
    session.start(VerificationKind::AgeAndName).await.unwrap();
    session.submit_name("Ana").await.unwrap();

    let outcome = session.run_to_completion().await.unwrap();
    assert_eq!(outcome.state, SessionState::PartiallyVerified);
    assert_eq!(outcome.label, Some(VerdictLabel::NameOnly));

    let handoff = IssuerHandoff::from_outcome(&outcome).expect("partial yields a hand-off");
    assert!(!handoff.verified_age);
    assert_eq!(handoff.verified_name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn test_legacy_name_key_is_resolved() {
    let capability = Arc::new(
        InMemoryCapability::accepting(["age", "given_name"]).with_script(vec![result_event(
            true,
            json!({ "age": 40, "given_name": disclosed(json!("Joao")) }),
        )]),
    );
    let mut session = session_with(capability.clone());
    session.start(VerificationKind::AgeAndName).await.unwrap();
    session.submit_name("joao").await.unwrap();

    let probed: Vec<String> = capability
        .probe_log()
        .iter()
        .map(|k| k.as_str().to_string())
        .collect();
    assert_eq!(probed, vec!["age", "firstname", "firstName", "given_name"]);

    let outcome = session.run_to_completion().await.unwrap();
    assert!(outcome.success);
}

// =========================================================================
// Single-attribute verifications
// =========================================================================

#[tokio::test]
async fn test_underage_date_of_birth_fails() {
    let capability = scripted(result_event(
        true,
        json!({ "dateOfBirth": disclosed(json!("2010-01-01")) }),
    ));
    let mut session = session_with(capability);
    session.start(VerificationKind::Age).await.unwrap();

    let outcome = session.run_to_completion().await.unwrap();
    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.age_years, Some(15));
    assert_eq!(outcome.label, Some(VerdictLabel::AgeNotVerified));
    assert!(IssuerHandoff::from_outcome(&outcome).is_none());
}

#[tokio::test]
async fn test_name_mismatch_fails() {
    let capability = scripted(result_event(true, json!({ "firstname": "Maria" })));
    let mut session = session_with(capability);
    session.start(VerificationKind::Name).await.unwrap();
    session.submit_name("Ana").await.unwrap();

    let outcome = session.run_to_completion().await.unwrap();
    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.label, Some(VerdictLabel::NameNotVerified));
    assert_eq!(outcome.name.as_deref(), Some("Maria"));
    assert!(outcome.message.ends_with("(received: \"Maria\")."));
}

#[tokio::test]
async fn test_configured_minimum_age_applies() {
    let config = VerifierConfig::from_toml("[policy]\nminimum_age = 21\n").unwrap();
    let capability = Arc::new(
        InMemoryCapability::new().with_script(vec![result_event(true, json!({ "age": 19 }))]),
    );
    let mut session = VerificationSession::new(capability, &config);
    session.start(VerificationKind::Age).await.unwrap();

    let outcome = session.run_to_completion().await.unwrap();
    assert_eq!(outcome.state, SessionState::Failed);
    assert!(outcome.message.contains("21+"));
}

// =========================================================================
// Device-driven endings
// =========================================================================

#[tokio::test]
async fn test_events_pushed_after_finalize() {
    let capability = Arc::new(InMemoryCapability::new());
    let mut session = session_with(capability.clone());
    session.start(VerificationKind::Age).await.unwrap();

    let emitter = capability.emitter().expect("request should be finalized");
    let device = tokio::spawn(async move {
        for event in device_progress() {
            assert!(emitter.emit(event).await);
        }
        emitter
            .emit(result_event(true, json!({ "age": disclosed(json!(22)) })))
            .await
    });

    let outcome = session.run_to_completion().await.unwrap();
    assert!(device.await.unwrap());
    assert!(outcome.success);
    assert_eq!(outcome.age_years, Some(22));
}

#[tokio::test]
async fn test_reject_during_proof_generation() {
    let capability = Arc::new(InMemoryCapability::new().with_script(vec![
        CapabilityEvent::RequestReceived,
        CapabilityEvent::GeneratingProof,
        CapabilityEvent::Reject,
        result_event(true, json!({ "age": 30 })),
    ]));
    let mut session = session_with(capability);
    session.start(VerificationKind::Age).await.unwrap();

    let outcome = session.run_to_completion().await.unwrap();
    assert_eq!(outcome.state, SessionState::Rejected);

    // The late result is read and ignored.
    assert_eq!(session.next_event().await.unwrap(), SessionState::Rejected);
    assert_eq!(session.outcome().unwrap().state, SessionState::Rejected);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let adult = scripted(result_event(true, json!({ "age": 30 })));
    let minor = scripted(result_event(true, json!({ "age": 12 })));
    let mut first = session_with(adult);
    let mut second = session_with(minor);

    first.start(VerificationKind::Age).await.unwrap();
    second.start(VerificationKind::Age).await.unwrap();
    assert_ne!(first.id(), second.id());

    let (a, b) = tokio::join!(first.run_to_completion(), second.run_to_completion());
    assert_eq!(a.unwrap().state, SessionState::Succeeded);
    assert_eq!(b.unwrap().state, SessionState::Failed);
}
