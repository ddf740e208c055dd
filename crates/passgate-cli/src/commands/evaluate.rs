//! `passgate evaluate`: extract and evaluate a result payload offline.

use chrono::NaiveDate;
use clap::Args;

use passgate_core::{RawResultPayload, VerificationKind, VerifierConfig};
use passgate_eligibility::{EligibilityEvaluator, ResultExtractor};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Result payload JSON (as string or path to file).
    #[arg(short, long)]
    pub payload: String,

    /// What the payload was requested for: age, name, or both.
    #[arg(short, long, default_value = "age")]
    pub kind: VerificationKind,

    /// Expected first name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Reference date for ages computed from a date of birth (YYYY-MM-DD).
    #[arg(long)]
    pub today: Option<String>,
}

pub fn run(args: &EvaluateArgs, config: &VerifierConfig) -> anyhow::Result<()> {
    // Try reading as file first, then as inline JSON
    let json_str = if std::path::Path::new(&args.payload).exists() {
        std::fs::read_to_string(&args.payload)?
    } else {
        args.payload.clone()
    };
    let payload: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| anyhow::anyhow!("invalid payload JSON: {}", e))?;

    let extractor = match &args.today {
        Some(today) => ResultExtractor::at(
            NaiveDate::parse_from_str(today, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("invalid --today date {}: {}", today, e))?,
        ),
        None => ResultExtractor::new(),
    };
    let evaluator = EligibilityEvaluator::new(config.policy.minimum_age);

    let outcome = extractor.extract(&RawResultPayload::new(payload));
    let verdict = evaluator.evaluate(&outcome, args.name.as_deref(), args.kind);
    let label = verdict.label();

    println!("Kind:           {}", args.kind);
    println!(
        "Age:            {}",
        outcome
            .age_years
            .map_or_else(|| "not disclosed".to_string(), |age| age.to_string())
    );
    println!(
        "Disclosed name: {}",
        outcome.disclosed_name.as_deref().unwrap_or("not disclosed")
    );
    println!("Verdict:        {}", label);
    println!();
    for check in &verdict.checks {
        let icon = if check.passed { "PASS" } else { "FAIL" };
        print!("  [{}] {}", icon, check.name);
        if let Some(ref detail) = check.detail {
            print!(": {}", detail);
        }
        println!();
    }
    println!();
    println!(
        "{}",
        label.message(
            args.name.as_deref(),
            outcome.disclosed_name.as_deref(),
            evaluator.minimum_age()
        )
    );

    Ok(())
}
