use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use passgate_core::RawResultPayload;

use crate::age::{compute_age, parse_birth_date};

/// Result keys that may carry the holder's age, in lookup order.
const AGE_KEYS: &[&str] = &["age", "dateOfBirth", "birthDate"];

/// Result keys that may carry the holder's first name, in lookup order.
const NAME_KEYS: &[&str] = &["firstname", "firstName", "given_name", "givenName", "name"];

/// Attributes pulled out of a result payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedOutcome {
    /// Whole years, if an age or date of birth was disclosed and readable.
    pub age_years: Option<u32>,
    /// First name exactly as disclosed.
    pub disclosed_name: Option<String>,
}

/// Reads ages and names out of the payload shapes capabilities produce.
///
/// Each attribute may arrive as a bare scalar or wrapped as
/// `{"disclose": {"result": value}}`, under any of several key names.
#[derive(Debug, Clone, Copy)]
pub struct ResultExtractor {
    today: NaiveDate,
}

impl ResultExtractor {
    /// Extractor computing ages against the current UTC date.
    pub fn new() -> Self {
        Self::at(chrono::Utc::now().date_naive())
    }

    /// Extractor computing ages against a fixed date.
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Both attributes at once.
    pub fn extract(&self, payload: &RawResultPayload) -> NormalizedOutcome {
        NormalizedOutcome {
            age_years: self.extract_age(payload),
            disclosed_name: self.extract_name(payload),
        }
    }

    /// Age in whole years. The first age key with a value decides; if that
    /// value cannot be read the result is `None`.
    pub fn extract_age(&self, payload: &RawResultPayload) -> Option<u32> {
        let (key, value) = AGE_KEYS
            .iter()
            .find_map(|key| disclosed_value(payload, key).map(|v| (*key, v)))?;

        let age = self.interpret_age(value);
        if age.is_none() {
            tracing::debug!(key, value = %value, "unreadable age value");
        }
        age
    }

    /// First name as disclosed, without trimming or case folding.
    pub fn extract_name(&self, payload: &RawResultPayload) -> Option<String> {
        NAME_KEYS
            .iter()
            .filter_map(|key| disclosed_value(payload, key))
            .find_map(name_from_value)
    }

    fn interpret_age(&self, value: &Value) -> Option<u32> {
        match value {
            Value::Number(n) => {
                if let Some(years) = n.as_u64() {
                    return u32::try_from(years).ok();
                }
                n.as_f64()
                    .filter(|years| years.is_finite() && *years >= 0.0 && *years <= f64::from(u32::MAX))
                    .map(|years| years.trunc() as u32)
            }
            Value::String(s) if s.contains('-') || s.contains('/') => {
                parse_birth_date(s).and_then(|dob| compute_age(dob, self.today))
            }
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        }
    }
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// The value under `key`, unwrapping a `{"disclose": {"result": v}}` wrapper.
fn disclosed_value<'a>(payload: &'a RawResultPayload, key: &str) -> Option<&'a Value> {
    let raw = payload.get(key)?;
    match raw.get("disclose").and_then(|d| d.get("result")) {
        Some(inner) if !inner.is_null() => Some(inner),
        Some(_) => None,
        None if raw.get("disclose").is_some() => None,
        None => Some(raw),
    }
}

fn name_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Object(obj) => ["first", "given"]
            .iter()
            .filter_map(|field| obj.get(*field).and_then(Value::as_str))
            .find_map(non_blank),
        _ => None,
    }
}

fn non_blank(s: &str) -> Option<String> {
    (!s.trim().is_empty()).then(|| s.to_string())
}
