use passgate_core::{AttributeKey, LogicalAttribute};

use crate::capability::RequestHandle;
use crate::error::DisclosureError;

/// Finds which of several synonymous key names a capability accepts.
///
/// Capability versions disagree on key names (`firstname` vs `given_name`
/// and so on). Candidates are tried in priority order and the first accepted
/// one wins, so the outcome is deterministic for a given capability.
pub struct AttributeResolver;

impl AttributeResolver {
    /// Resolve `attribute` by offering each candidate to `handle` in order.
    ///
    /// Rejections with [`DisclosureError::UnsupportedAttribute`] move on to the
    /// next candidate. Any other error is returned immediately.
    pub fn resolve(
        attribute: LogicalAttribute,
        candidates: &[AttributeKey],
        handle: &mut dyn RequestHandle,
    ) -> Result<AttributeKey, DisclosureError> {
        let mut tried = Vec::with_capacity(candidates.len());

        for key in candidates {
            tried.push(key.clone());
            match handle.disclose(key) {
                Ok(()) => {
                    tracing::debug!(%attribute, key = %key, "attribute key accepted");
                    return Ok(key.clone());
                }
                Err(DisclosureError::UnsupportedAttribute(rejected)) => {
                    tracing::debug!(%attribute, key = %rejected, "attribute key rejected, trying next");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(%attribute, tried = tried.len(), "no compatible attribute key");
        Err(DisclosureError::NoCompatibleKey { attribute, tried })
    }

    /// Resolve `attribute` using its built-in candidate list.
    pub fn resolve_default(
        attribute: LogicalAttribute,
        handle: &mut dyn RequestHandle,
    ) -> Result<AttributeKey, DisclosureError> {
        Self::resolve(attribute, &attribute.candidate_keys(), handle)
    }
}
