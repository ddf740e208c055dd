//! `passgate verify`: drive a full verification against the in-memory capability.
//!
//! The holder's device is simulated by a scripted event sequence built from
//! the flags, so every branch of the session can be exercised locally.

use clap::Args;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};

use passgate_core::{RawResultPayload, VerificationKind, VerifierConfig};
use passgate_disclosure::{CapabilityEvent, InMemoryCapability};
use passgate_session::{
    IssuerHandoff, QrOptions, QrRenderer, RenderError, SessionUpdate, VerificationSession,
};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// What to verify: age, name, or both.
    #[arg(short, long, default_value = "age")]
    pub kind: VerificationKind,

    /// Expected first name, required for name and both.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Age the simulated holder discloses (defaults to the configured minimum).
    #[arg(long, conflicts_with = "dob")]
    pub age: Option<u32>,

    /// Date of birth the simulated holder discloses instead of an age (YYYY-MM-DD).
    #[arg(long)]
    pub dob: Option<String>,

    /// First name the simulated holder discloses (defaults to --name).
    #[arg(long)]
    pub disclosed_name: Option<String>,

    /// Report the proof as not verified.
    #[arg(long)]
    pub unverified: bool,

    /// Simulate the holder rejecting the request.
    #[arg(long, conflicts_with = "unverified")]
    pub reject: bool,
}

/// Prints the request URL instead of drawing a QR code.
struct TerminalRenderer;

impl QrRenderer for TerminalRenderer {
    fn render(&self, url: &str, options: &QrOptions) -> Result<(), RenderError> {
        println!(
            "Scan to verify: {url} ({}px, margin {}, {} on {})",
            options.width, options.margin, options.dark, options.light
        );
        Ok(())
    }
}

pub async fn run(args: &VerifyArgs, config: &VerifierConfig) -> anyhow::Result<()> {
    let expected_name = match (args.kind.requires_name(), args.name.as_deref()) {
        (true, None) => anyhow::bail!("--name is required when verifying {}", args.kind),
        (_, name) => name,
    };

    let capability = InMemoryCapability::new().with_script(script(args, config));
    let mut session = VerificationSession::new(Arc::new(capability), config)
        .with_renderer(Arc::new(TerminalRenderer));
    let mut updates = session.subscribe();

    tracing::debug!(session_id = %session.id(), kind = %args.kind, "running simulated verification");

    let started = session.start(args.kind).await;
    print_updates(&mut updates);
    started?;

    if let Some(name) = expected_name.filter(|_| args.kind.requires_name()) {
        let submitted = session.submit_name(name).await;
        print_updates(&mut updates);
        submitted?;
    }

    if let Some(spec) = session.disclosure_spec() {
        println!("Purpose: {} ({})", spec.purpose(), spec.scope());
    }

    let outcome = session.run_to_completion().await;
    print_updates(&mut updates);
    let outcome = outcome?;

    println!();
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(handoff) = IssuerHandoff::from_outcome(&outcome) {
        let params: Map<String, Value> = handoff
            .params()
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        println!();
        println!("Issuer hand-off:");
        println!("{}", serde_json::to_string_pretty(&params)?);
    }

    Ok(())
}

/// Events the simulated device sends once the request is finalized.
fn script(args: &VerifyArgs, config: &VerifierConfig) -> Vec<CapabilityEvent> {
    let mut events = vec![
        CapabilityEvent::RequestReceived,
        CapabilityEvent::GeneratingProof,
        CapabilityEvent::ProofGenerated {
            name: format!("{}-disclosure", args.kind),
        },
    ];
    if args.reject {
        events.push(CapabilityEvent::Reject);
        return events;
    }

    let mut result = Map::new();
    if args.kind.includes_age() {
        match (&args.dob, args.age) {
            (Some(dob), _) => {
                result.insert("dateOfBirth".into(), disclosed(json!(dob)));
            }
            (None, age) => {
                let age = age.unwrap_or(config.policy.minimum_age);
                result.insert("age".into(), disclosed(json!(age)));
            }
        }
    }
    if args.kind.requires_name() {
        if let Some(name) = args.disclosed_name.as_ref().or(args.name.as_ref()) {
            result.insert("firstname".into(), disclosed(json!(name)));
        }
    }

    events.push(CapabilityEvent::Result {
        verified: !args.unverified,
        result: RawResultPayload::new(Value::Object(result)),
    });
    events
}

fn disclosed(value: Value) -> Value {
    json!({ "disclose": { "result": value } })
}

fn print_updates(updates: &mut broadcast::Receiver<SessionUpdate>) {
    loop {
        match updates.try_recv() {
            Ok(SessionUpdate::Status(status)) if !status.message.is_empty() => {
                println!(
                    "[{:<7}] {:<17} {}",
                    status.severity.to_string(),
                    status.state.to_string(),
                    status.message
                );
            }
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "status updates dropped");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
