use tokio::sync::mpsc;

use passgate_core::config::RequestConfig;
use passgate_core::{DisclosureSpec, RequestMetadata, VerificationKind};

use crate::capability::{ProofCapability, RequestHandle};
use crate::error::DisclosureError;
use crate::events::CapabilityEvent;
use crate::resolver::AttributeResolver;

/// Purpose and scope shown to the holder for a verification kind.
fn purpose_and_scope(kind: VerificationKind) -> (&'static str, &'static str) {
    match kind {
        VerificationKind::Age => (
            "Verify age for enhanced language certificate credibility",
            "age-verification",
        ),
        VerificationKind::Name => (
            "Verify first name for personalized certificate validation",
            "name-verification",
        ),
        VerificationKind::AgeAndName => (
            "Verify age and identity for complete certificate validation",
            "identity-verification",
        ),
    }
}

/// A finalized request: what was asked for, where the holder scans it, and
/// the event stream that reports progress.
#[derive(Debug)]
pub struct BuiltRequest {
    pub spec: DisclosureSpec,
    pub url: String,
    pub events: mpsc::Receiver<CapabilityEvent>,
}

/// Turns a verification kind into a disclosure request.
pub struct RequestBuilder {
    requester: RequestConfig,
}

impl RequestBuilder {
    /// Create a builder presenting the verifier as described by `requester`.
    pub fn new(requester: RequestConfig) -> Self {
        Self { requester }
    }

    /// Request metadata for `kind`.
    pub fn metadata(&self, kind: VerificationKind) -> RequestMetadata {
        let (purpose, scope) = purpose_and_scope(kind);
        RequestMetadata {
            purpose: purpose.into(),
            scope: scope.into(),
            display_name: self.requester.display_name.clone(),
            logo_ref: self.requester.logo_ref.clone(),
            dev_mode: self.requester.dev_mode,
        }
    }

    /// Resolve every attribute of `kind` against `handle`, in order.
    ///
    /// An attribute without a compatible key fails the whole build, even if
    /// earlier attributes resolved.
    pub fn disclose_all(
        &self,
        kind: VerificationKind,
        handle: &mut dyn RequestHandle,
    ) -> Result<DisclosureSpec, DisclosureError> {
        let mut keys = Vec::with_capacity(kind.attributes().len());
        for attribute in kind.attributes() {
            keys.push(AttributeResolver::resolve_default(*attribute, handle)?);
        }

        let (purpose, scope) = purpose_and_scope(kind);
        Ok(DisclosureSpec::new(keys, purpose, scope)?)
    }

    /// Create, populate, and finalize a request for `kind` on `capability`.
    pub async fn build(
        &self,
        kind: VerificationKind,
        capability: &dyn ProofCapability,
    ) -> Result<BuiltRequest, DisclosureError> {
        let metadata = self.metadata(kind);
        let mut handle = capability.create_request(&metadata).await?;
        let spec = self.disclose_all(kind, handle.as_mut())?;
        let pending = handle.finalize()?;

        tracing::info!(
            capability = capability.capability_id(),
            %kind,
            keys = ?spec.keys(),
            "disclosure request built"
        );

        Ok(BuiltRequest {
            spec,
            url: pending.url,
            events: pending.events,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new(RequestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCapability;
    use passgate_core::{AttributeKey, LogicalAttribute};

    #[test]
    fn test_metadata_table() {
        let builder = RequestBuilder::default();
        assert_eq!(builder.metadata(VerificationKind::Age).scope, "age-verification");
        assert_eq!(builder.metadata(VerificationKind::Name).scope, "name-verification");
        assert_eq!(
            builder.metadata(VerificationKind::AgeAndName).scope,
            "identity-verification"
        );
        let purposes: Vec<String> = [
            VerificationKind::Age,
            VerificationKind::Name,
            VerificationKind::AgeAndName,
        ]
        .iter()
        .map(|k| builder.metadata(*k).purpose)
        .collect();
        assert_eq!(
            purposes,
            vec![
                "Verify age for enhanced language certificate credibility",
                "Verify first name for personalized certificate validation",
                "Verify age and identity for complete certificate validation",
            ]
        );
    }

    #[test]
    fn test_metadata_carries_requester() {
        let builder = RequestBuilder::new(RequestConfig {
            display_name: "Cinema".into(),
            logo_ref: "https://cinema.example/logo.png".into(),
            dev_mode: true,
        });
        let meta = builder.metadata(VerificationKind::Age);
        assert_eq!(meta.display_name, "Cinema");
        assert!(meta.dev_mode);
    }

    #[tokio::test]
    async fn test_build_age_only() {
        let cap = InMemoryCapability::new();
        let built = RequestBuilder::default()
            .build(VerificationKind::Age, &cap)
            .await
            .unwrap();
        assert_eq!(built.spec.keys(), &[AttributeKey::new("age")]);
        assert_eq!(built.spec.scope(), "age-verification");
        assert!(built.url.contains("/request/"));
        assert_eq!(cap.probe_log(), vec![AttributeKey::new("age")]);
    }

    #[tokio::test]
    async fn test_build_name_with_legacy_schema() {
        let cap = InMemoryCapability::accepting(["givenName"]);
        let built = RequestBuilder::default()
            .build(VerificationKind::Name, &cap)
            .await
            .unwrap();
        assert_eq!(built.spec.keys(), &[AttributeKey::new("givenName")]);
        assert_eq!(cap.probe_log().len(), 4);
    }

    #[tokio::test]
    async fn test_build_both_in_order() {
        let cap = InMemoryCapability::accepting(["firstName", "age"]);
        let built = RequestBuilder::default()
            .build(VerificationKind::AgeAndName, &cap)
            .await
            .unwrap();
        assert_eq!(
            built.spec.keys(),
            &[AttributeKey::new("age"), AttributeKey::new("firstName")]
        );
        assert_eq!(built.spec.scope(), "identity-verification");
        assert_eq!(
            cap.last_metadata().unwrap().scope,
            "identity-verification"
        );
    }

    #[tokio::test]
    async fn test_partial_resolution_fails_whole_build() {
        let cap = InMemoryCapability::accepting(["age"]);
        let err = RequestBuilder::default()
            .build(VerificationKind::AgeAndName, &cap)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DisclosureError::NoCompatibleKey {
                attribute: LogicalAttribute::FirstName,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_age_has_no_date_of_birth_fallback() {
        let cap = InMemoryCapability::accepting(["dateOfBirth", "firstname"]);
        let err = RequestBuilder::default()
            .build(VerificationKind::Age, &cap)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DisclosureError::NoCompatibleKey {
                attribute: LogicalAttribute::Age,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_request_creation_failure_propagates() {
        let cap = InMemoryCapability::new().failing_requests("rate limited");
        let err = RequestBuilder::default()
            .build(VerificationKind::Age, &cap)
            .await
            .unwrap_err();
        assert!(matches!(err, DisclosureError::RequestCreationFailed(_)));
    }
}
