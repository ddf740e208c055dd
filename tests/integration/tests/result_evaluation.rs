//! Integration test: result payloads through extraction and evaluation.

use chrono::NaiveDate;
use serde_json::json;

use passgate_core::{RawResultPayload, VerificationKind};
use passgate_eligibility::{EligibilityEvaluator, ResultExtractor, VerdictLabel};
use passgate_integration_tests::{disclosed, reference_date};

fn evaluate(payload: serde_json::Value, name: Option<&str>, kind: VerificationKind) -> VerdictLabel {
    let outcome = ResultExtractor::at(reference_date()).extract(&RawResultPayload::new(payload));
    EligibilityEvaluator::default()
        .evaluate(&outcome, name, kind)
        .label()
}

#[test]
fn test_all_combined_labels() {
    let kind = VerificationKind::AgeAndName;
    let cases = [
        (json!({"age": disclosed(json!(18)), "firstName": disclosed(json!("ana"))}), VerdictLabel::FullyVerified),
        (json!({"age": disclosed(json!(18)), "firstName": disclosed(json!("eva"))}), VerdictLabel::AgeOnly),
        (json!({"age": disclosed(json!(17)), "firstName": disclosed(json!("ANA"))}), VerdictLabel::NameOnly),
        (json!({"age": disclosed(json!(17))}), VerdictLabel::NeitherVerified),
    ];
    for (payload, expected) in cases {
        assert_eq!(evaluate(payload, Some("Ana"), kind), expected);
    }
}

#[test]
fn test_birthday_boundary() {
    let payload = RawResultPayload::new(json!({"birthDate": "2007-06-15"}));
    let evaluator = EligibilityEvaluator::default();

    let on_birthday = ResultExtractor::at(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    let day_before = ResultExtractor::at(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());

    let verdict = evaluator.evaluate(&on_birthday.extract(&payload), None, VerificationKind::Age);
    assert_eq!(verdict.label(), VerdictLabel::AgeVerified);

    let verdict = evaluator.evaluate(&day_before.extract(&payload), None, VerificationKind::Age);
    assert_eq!(verdict.label(), VerdictLabel::AgeNotVerified);
}

#[test]
fn test_missing_attributes_fail_with_details() {
    let outcome = ResultExtractor::at(reference_date()).extract(&RawResultPayload::default());
    let verdict = EligibilityEvaluator::default().evaluate(
        &outcome,
        Some("Ana"),
        VerificationKind::AgeAndName,
    );
    assert_eq!(verdict.label(), VerdictLabel::NeitherVerified);
    assert!(verdict.checks.iter().all(|c| !c.passed && c.detail.is_some()));
}
