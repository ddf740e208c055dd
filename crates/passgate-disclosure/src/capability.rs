use async_trait::async_trait;
use tokio::sync::mpsc;

use passgate_core::{AttributeKey, RequestMetadata};

use crate::error::DisclosureError;
use crate::events::CapabilityEvent;

/// Proof capability interface.
///
/// Each implementation bridges Passgate to a concrete proof system that
/// accepts a disclosure query and later reports whether the holder's proof
/// verified, together with the disclosed attributes.
#[async_trait]
pub trait ProofCapability: Send + Sync {
    /// Make sure the capability is reachable. Implementations with nothing to
    /// set up keep the default.
    async fn initialize(&self) -> Result<(), DisclosureError> {
        Ok(())
    }

    /// Open a new disclosure request.
    async fn create_request(
        &self,
        metadata: &RequestMetadata,
    ) -> Result<Box<dyn RequestHandle>, DisclosureError>;

    /// Return the unique identifier of this capability (e.g. "in-memory").
    fn capability_id(&self) -> &str;
}

/// A request under construction.
pub trait RequestHandle: Send {
    /// Add a key to the request. A rejected key fails with
    /// [`DisclosureError::UnsupportedAttribute`] and leaves the request unchanged.
    fn disclose(&mut self, key: &AttributeKey) -> Result<(), DisclosureError>;

    /// Keys accepted so far, in the order they were added.
    fn disclosed(&self) -> Vec<AttributeKey>;

    /// Seal the request, producing the URL the holder scans and the event stream.
    fn finalize(self: Box<Self>) -> Result<PendingRequest, DisclosureError>;
}

/// A finalized request waiting for the holder.
#[derive(Debug)]
pub struct PendingRequest {
    /// URL encoded into the QR code.
    pub url: String,
    /// Lifecycle events for this request.
    pub events: mpsc::Receiver<CapabilityEvent>,
}
