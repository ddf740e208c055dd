use passgate_core::{AttributeKey, CoreError, LogicalAttribute};

/// Disclosure request errors.
#[derive(Debug, thiserror::Error)]
pub enum DisclosureError {
    #[error("no compatible key for {attribute} (tried: {})", format_keys(.tried))]
    NoCompatibleKey {
        attribute: LogicalAttribute,
        tried: Vec<AttributeKey>,
    },

    #[error("proof capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("request creation failed: {0}")]
    RequestCreationFailed(String),

    #[error("unsupported attribute: {0}")]
    UnsupportedAttribute(AttributeKey),

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

fn format_keys(keys: &[AttributeKey]) -> String {
    if keys.is_empty() {
        return "none".into();
    }
    keys.iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
