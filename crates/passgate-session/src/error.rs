use passgate_core::CoreError;
use passgate_disclosure::DisclosureError;

use crate::render::RenderError;

/// Verification session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("disclosure error: {0}")]
    Disclosure(#[from] DisclosureError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("no verification request in flight")]
    NotStarted,
}
