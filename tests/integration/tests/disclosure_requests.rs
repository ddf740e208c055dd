//! Integration test: building disclosure requests from configuration.

use passgate_core::{LogicalAttribute, VerificationKind, VerifierConfig};
use passgate_disclosure::{DisclosureError, InMemoryCapability, ProofCapability, RequestBuilder};

#[tokio::test]
async fn test_config_flows_into_request_metadata() {
    let config = VerifierConfig::from_toml(
        r#"
[request]
display_name = "Certificate Desk"
dev_mode = true
"#,
    )
    .unwrap();
    let capability = InMemoryCapability::new().with_base_url("https://verify.example/");
    let builder = RequestBuilder::new(config.request.clone());

    let built = builder
        .build(VerificationKind::Name, &capability)
        .await
        .expect("build should succeed");
    assert!(built.url.starts_with("https://verify.example/request/"));
    assert_eq!(built.spec.scope(), "name-verification");

    let metadata = capability.last_metadata().unwrap();
    assert_eq!(metadata.display_name, "Certificate Desk");
    assert!(metadata.dev_mode);
    assert_eq!(metadata.logo_ref, "https://zkpassport.id/logo.png");
}

#[tokio::test]
async fn test_last_name_synonym_is_found() {
    let capability = InMemoryCapability::accepting(["givenName"]);
    let built = RequestBuilder::default()
        .build(VerificationKind::Name, &capability)
        .await
        .expect("build should succeed");
    assert!(built.spec.contains("givenName"));
    assert_eq!(capability.probe_log().len(), 4);
}

#[tokio::test]
async fn test_missing_age_key_reports_tried_candidates() {
    let capability = InMemoryCapability::accepting(["firstname"]);
    let err = RequestBuilder::default()
        .build(VerificationKind::AgeAndName, &capability)
        .await
        .unwrap_err();
    match err {
        DisclosureError::NoCompatibleKey { attribute, tried } => {
            assert_eq!(attribute, LogicalAttribute::Age);
            assert_eq!(tried.len(), 1);
            assert_eq!(tried[0].as_str(), "age");
        }
        other => panic!("unexpected error {other}"),
    }
    // The name attribute is never reached.
    assert_eq!(capability.probe_log().len(), 1);
}

#[tokio::test]
async fn test_capability_failures_surface() {
    let capability = InMemoryCapability::new().failing_requests("service offline");
    let err = RequestBuilder::default()
        .build(VerificationKind::Age, &capability)
        .await
        .unwrap_err();
    assert!(matches!(err, DisclosureError::RequestCreationFailed(ref r) if r == "service offline"));

    let capability = InMemoryCapability::new().unavailable();
    assert!(matches!(
        capability.initialize().await,
        Err(DisclosureError::CapabilityUnavailable(_))
    ));
}
