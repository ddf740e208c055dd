use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Which attributes a verification asks the holder to disclose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationKind {
    /// Prove the holder is an adult.
    Age,
    /// Prove the holder's first name matches an expected name.
    Name,
    /// Both of the above in a single request.
    AgeAndName,
}

impl VerificationKind {
    /// Whether the requester must supply an expected name before the request is built.
    pub fn requires_name(&self) -> bool {
        matches!(self, Self::Name | Self::AgeAndName)
    }

    /// Whether the age attribute is part of this verification.
    pub fn includes_age(&self) -> bool {
        matches!(self, Self::Age | Self::AgeAndName)
    }

    /// Logical attributes to disclose, in request order.
    pub fn attributes(&self) -> &'static [LogicalAttribute] {
        match self {
            Self::Age => &[LogicalAttribute::Age],
            Self::Name => &[LogicalAttribute::FirstName],
            Self::AgeAndName => &[LogicalAttribute::Age, LogicalAttribute::FirstName],
        }
    }
}

impl fmt::Display for VerificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Age => write!(f, "age"),
            Self::Name => write!(f, "name"),
            Self::AgeAndName => write!(f, "both"),
        }
    }
}

impl FromStr for VerificationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age" => Ok(Self::Age),
            "name" => Ok(Self::Name),
            "both" | "age-and-name" | "age_and_name" => Ok(Self::AgeAndName),
            other => Err(CoreError::UnknownKind(other.to_string())),
        }
    }
}

/// A credential attribute as the verifier thinks about it, independent of
/// the key name a particular capability version expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalAttribute {
    Age,
    FirstName,
}

/// Disclosure candidates for the age attribute. Date-of-birth keys are only
/// consulted when reading results, never when building a request.
const AGE_CANDIDATES: &[&str] = &["age"];

/// Observed first-name key names across capability versions, highest priority first.
const FIRST_NAME_CANDIDATES: &[&str] = &["firstname", "firstName", "given_name", "givenName"];

impl LogicalAttribute {
    /// Candidate disclosure keys in the order they must be attempted.
    pub fn candidate_keys(&self) -> Vec<AttributeKey> {
        let names = match self {
            Self::Age => AGE_CANDIDATES,
            Self::FirstName => FIRST_NAME_CANDIDATES,
        };
        names.iter().map(|n| AttributeKey::new(*n)).collect()
    }
}

impl fmt::Display for LogicalAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Age => write!(f, "age"),
            Self::FirstName => write!(f, "first name"),
        }
    }
}

/// A field name as understood by the external proof capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AttributeKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// The set of keys a request discloses, plus the purpose and scope shown to the holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureSpec {
    keys: Vec<AttributeKey>,
    purpose: String,
    scope: String,
}

impl DisclosureSpec {
    /// Create a spec. Fails if `keys` is empty; duplicate keys are dropped
    /// keeping the first occurrence.
    pub fn new(
        keys: Vec<AttributeKey>,
        purpose: impl Into<String>,
        scope: impl Into<String>,
    ) -> Result<Self, CoreError> {
        if keys.is_empty() {
            return Err(CoreError::ValidationError(
                "disclosure spec must contain at least one key".into(),
            ));
        }
        let mut unique: Vec<AttributeKey> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Ok(Self {
            keys: unique,
            purpose: purpose.into(),
            scope: scope.into(),
        })
    }

    pub fn keys(&self) -> &[AttributeKey] {
        &self.keys
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k.as_str() == key)
    }
}

/// Metadata handed to the capability when a request is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub purpose: String,
    pub scope: String,
    /// Verifier name displayed on the holder's device.
    pub display_name: String,
    /// Logo shown next to the display name.
    pub logo_ref: String,
    /// Ask the capability to accept development credentials.
    pub dev_mode: bool,
}

/// The result object reported by the proof capability.
///
/// Values are either scalars or `{"disclose": {"result": value}}` wrappers.
/// A payload that is not a JSON object behaves as an empty one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResultPayload(pub serde_json::Value);

impl RawResultPayload {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Look up a top-level key. JSON `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0
            .as_object()
            .and_then(|obj| obj.get(key))
            .filter(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.0.as_object().map_or(true, |obj| obj.is_empty())
    }
}

impl From<serde_json::Value> for RawResultPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
