use serde::{Deserialize, Serialize};
use std::fmt;

use passgate_core::VerificationKind;

use crate::extractor::NormalizedOutcome;

/// Age in whole years at which the age check passes unless configured otherwise.
pub const DEFAULT_MINIMUM_AGE: u32 = 18;

/// Distinct outcome of an evaluation, used for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictLabel {
    AgeVerified,
    AgeNotVerified,
    NameVerified,
    NameNotVerified,
    /// Age and name both verified.
    FullyVerified,
    /// Age verified, name did not match.
    AgeOnly,
    /// Name matched, age not verified.
    NameOnly,
    /// Neither attribute verified.
    NeitherVerified,
}

impl VerdictLabel {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::AgeVerified | Self::NameVerified | Self::FullyVerified
        )
    }

    /// Exactly one attribute of a combined request verified.
    pub fn is_partial(&self) -> bool {
        matches!(self, Self::AgeOnly | Self::NameOnly)
    }

    /// Message shown to the user. A failed name match quotes the name that
    /// came back, when there was one.
    pub fn message(
        &self,
        expected_name: Option<&str>,
        disclosed_name: Option<&str>,
        minimum_age: u32,
    ) -> String {
        let name = expected_name.map(str::trim).unwrap_or("");
        match self {
            Self::AgeVerified => format!(
                "Age verification successful! You are verified as {minimum_age}+ without revealing personal information."
            ),
            Self::AgeNotVerified => format!(
                "Age verification failed. You must be {minimum_age}+ to proceed."
            ),
            Self::NameVerified => format!(
                "Name verification successful! Your first name \"{name}\" has been verified without revealing other personal information."
            ),
            Self::NameNotVerified => match disclosed_name {
                Some(received) => format!(
                    "Name verification failed. The name \"{name}\" does not match your passport (received: \"{received}\")."
                ),
                None => format!(
                    "Name verification failed. The name \"{name}\" does not match your passport."
                ),
            },
            Self::FullyVerified => format!(
                "Complete verification successful! Age ({minimum_age}+) and name \"{name}\" verified without revealing other personal information."
            ),
            Self::AgeOnly => format!(
                "Partial verification: Age verified but name \"{name}\" does not match your passport."
            ),
            Self::NameOnly => format!(
                "Partial verification: Name verified but you must be {minimum_age}+ to proceed."
            ),
            Self::NeitherVerified => format!(
                "Verification failed: Neither age nor name \"{name}\" could be verified."
            ),
        }
    }
}

impl fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgeVerified => write!(f, "age_verified"),
            Self::AgeNotVerified => write!(f, "age_not_verified"),
            Self::NameVerified => write!(f, "name_verified"),
            Self::NameNotVerified => write!(f, "name_not_verified"),
            Self::FullyVerified => write!(f, "fully_verified"),
            Self::AgeOnly => write!(f, "age_only"),
            Self::NameOnly => write!(f, "name_only"),
            Self::NeitherVerified => write!(f, "neither_verified"),
        }
    }
}

/// An individual eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCheck {
    /// Name of the check.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Optional detail message.
    pub detail: Option<String>,
}

/// Judgment over a normalized outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub kind: VerificationKind,
    pub age_verified: bool,
    pub name_verified: bool,
    /// Checks for the attributes `kind` consults.
    pub checks: Vec<EligibilityCheck>,
}

impl EligibilityVerdict {
    pub fn label(&self) -> VerdictLabel {
        match (self.kind, self.age_verified, self.name_verified) {
            (VerificationKind::Age, true, _) => VerdictLabel::AgeVerified,
            (VerificationKind::Age, false, _) => VerdictLabel::AgeNotVerified,
            (VerificationKind::Name, _, true) => VerdictLabel::NameVerified,
            (VerificationKind::Name, _, false) => VerdictLabel::NameNotVerified,
            (VerificationKind::AgeAndName, true, true) => VerdictLabel::FullyVerified,
            (VerificationKind::AgeAndName, true, false) => VerdictLabel::AgeOnly,
            (VerificationKind::AgeAndName, false, true) => VerdictLabel::NameOnly,
            (VerificationKind::AgeAndName, false, false) => VerdictLabel::NeitherVerified,
        }
    }

    pub fn is_success(&self) -> bool {
        self.label().is_success()
    }

    pub fn is_partial(&self) -> bool {
        self.label().is_partial()
    }
}

/// Applies the verifier's policy to disclosed attributes.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityEvaluator {
    minimum_age: u32,
}

impl EligibilityEvaluator {
    pub fn new(minimum_age: u32) -> Self {
        Self { minimum_age }
    }

    pub fn minimum_age(&self) -> u32 {
        self.minimum_age
    }

    /// Evaluate `outcome` for `kind`, comparing names against `expected_name`.
    pub fn evaluate(
        &self,
        outcome: &NormalizedOutcome,
        expected_name: Option<&str>,
        kind: VerificationKind,
    ) -> EligibilityVerdict {
        let age_verified = outcome.age_years.is_some_and(|age| age >= self.minimum_age);
        let name_verified = match (outcome.disclosed_name.as_deref(), expected_name) {
            (Some(disclosed), Some(expected)) => names_match(disclosed, expected),
            _ => false,
        };

        let mut checks = Vec::new();
        if kind.includes_age() {
            checks.push(EligibilityCheck {
                name: "age_threshold".into(),
                passed: age_verified,
                detail: match outcome.age_years {
                    _ if age_verified => None,
                    Some(age) => Some(format!("age {} is below {}", age, self.minimum_age)),
                    None => Some("age not found in verification result".into()),
                },
            });
        }
        if kind.requires_name() {
            checks.push(EligibilityCheck {
                name: "name_match".into(),
                passed: name_verified,
                detail: match (outcome.disclosed_name.as_deref(), expected_name) {
                    _ if name_verified => None,
                    (None, _) => Some("name not found in verification result".into()),
                    (_, None) => Some("expected name not set".into()),
                    (Some(disclosed), Some(expected)) => Some(format!(
                        "disclosed name \"{}\" does not match \"{}\"",
                        disclosed.trim(),
                        expected.trim()
                    )),
                },
            });
        }

        let verdict = EligibilityVerdict {
            kind,
            age_verified,
            name_verified,
            checks,
        };
        tracing::debug!(%kind, label = %verdict.label(), "eligibility evaluated");
        verdict
    }
}

impl Default for EligibilityEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MINIMUM_AGE)
    }
}

/// Case-insensitive comparison ignoring surrounding whitespace.
pub fn names_match(disclosed: &str, expected: &str) -> bool {
    disclosed.trim().to_lowercase() == expected.trim().to_lowercase()
}
