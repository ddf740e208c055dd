//! Passgate Session: drives one verification attempt from the user's
//! request to a terminal verdict.
//!
//! A [`VerificationSession`] builds the disclosure request, shows it as a QR
//! code, follows the capability's lifecycle events, and publishes a status
//! update on every state change plus a [`VerificationOutcome`] when the
//! attempt ends.

pub mod error;
pub mod outcome;
pub mod render;
pub mod session;
pub mod status;
pub mod validation;

pub use error::SessionError;
pub use outcome::{IssuerHandoff, VerificationOutcome};
pub use render::{QrOptions, QrRenderer, RenderError};
pub use session::VerificationSession;
pub use status::{SessionUpdate, Severity, StatusUpdate};
pub use validation::validate_name;
