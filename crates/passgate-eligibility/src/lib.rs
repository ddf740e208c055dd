//! Passgate Eligibility: normalizing disclosed attributes and judging them
//! against the verifier's policy.
//!
//! Nothing here returns an error: missing or malformed data degrades to
//! `None`/`false` so every result payload produces a definite verdict.

pub mod age;
pub mod evaluator;
pub mod extractor;

pub use age::compute_age;
pub use evaluator::{EligibilityCheck, EligibilityEvaluator, EligibilityVerdict, VerdictLabel};
pub use extractor::{NormalizedOutcome, ResultExtractor};
