use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use passgate_core::{SessionState, VerificationKind};
use passgate_eligibility::VerdictLabel;

/// Structured summary published when an attempt ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub kind: VerificationKind,
    /// Terminal state the attempt ended in.
    pub state: SessionState,
    pub success: bool,
    /// Only part of a combined request verified.
    pub partial: bool,
    pub age_verified: bool,
    pub name_verified: bool,
    /// Age as disclosed, if readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
    /// First name as disclosed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Eligibility label; absent when no verified result was evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<VerdictLabel>,
    pub message: String,
    pub completed_at: DateTime<Utc>,
}

impl VerificationOutcome {
    /// Outcome of an attempt that ended without an evaluated result.
    pub(crate) fn unevaluated(
        kind: VerificationKind,
        state: SessionState,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            state,
            success: false,
            partial: false,
            age_verified: false,
            name_verified: false,
            age_years: None,
            name: None,
            label: None,
            message: message.into(),
            completed_at: Utc::now(),
        }
    }
}

/// Verified attributes handed to a downstream issuer flow as opaque parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerHandoff {
    pub verified_age: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_name: Option<String>,
    pub verification_timestamp: DateTime<Utc>,
}

impl IssuerHandoff {
    /// Build a hand-off from a successful or partial outcome. Attributes that
    /// did not verify are left out.
    pub fn from_outcome(outcome: &VerificationOutcome) -> Option<Self> {
        if !(outcome.success || outcome.partial) {
            return None;
        }
        Some(Self {
            verified_age: outcome.age_verified,
            verified_name: if outcome.name_verified {
                outcome.name.as_ref().map(|n| n.trim().to_string())
            } else {
                None
            },
            verification_timestamp: outcome.completed_at,
        })
    }

    /// Query parameters understood by the issuer page.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(3);
        if self.verified_age {
            params.push(("verified_age".into(), "true".into()));
        }
        if let Some(name) = &self.verified_name {
            params.push(("verified_name".into(), name.clone()));
        }
        params.push((
            "verification_timestamp".into(),
            self.verification_timestamp.to_rfc3339(),
        ));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, partial: bool, age: bool, name: bool) -> VerificationOutcome {
        VerificationOutcome {
            success,
            partial,
            age_verified: age,
            name_verified: name,
            age_years: Some(30),
            name: Some(" Ana ".into()),
            label: None,
            ..VerificationOutcome::unevaluated(
                VerificationKind::AgeAndName,
                SessionState::Succeeded,
                "done",
            )
        }
    }

    #[test]
    fn test_handoff_only_for_positive_outcomes() {
        assert!(IssuerHandoff::from_outcome(&outcome(false, false, false, false)).is_none());
        assert!(IssuerHandoff::from_outcome(&outcome(true, false, true, true)).is_some());
        assert!(IssuerHandoff::from_outcome(&outcome(false, true, true, false)).is_some());
    }

    #[test]
    fn test_handoff_params_include_only_verified_attributes() {
        let handoff = IssuerHandoff::from_outcome(&outcome(false, true, true, false)).unwrap();
        let params = handoff.params();
        assert_eq!(params[0], ("verified_age".to_string(), "true".to_string()));
        assert!(params.iter().all(|(k, _)| k != "verified_name"));
        assert_eq!(params.last().unwrap().0, "verification_timestamp");

        let handoff = IssuerHandoff::from_outcome(&outcome(true, false, true, true)).unwrap();
        assert_eq!(handoff.verified_name.as_deref(), Some("Ana"));
        assert_eq!(handoff.params().len(), 3);
    }

    #[test]
    fn test_outcome_json_omits_missing_attributes() {
        let o = VerificationOutcome::unevaluated(
            VerificationKind::Age,
            SessionState::Rejected,
            "rejected",
        );
        let json = serde_json::to_value(&o).unwrap();
        assert!(json.get("age_years").is_none());
        assert!(json.get("label").is_none());
        assert_eq!(json["kind"], "age");
        assert_eq!(json["success"], false);
    }
}
