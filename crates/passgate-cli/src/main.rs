//! Passgate CLI: run simulated verifications and evaluate result payloads.
//!
//! Subcommands: init, verify, evaluate.

mod commands;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use passgate_core::VerifierConfig;

/// Passgate: selective-disclosure identity verification.
#[derive(Parser, Debug)]
#[command(name = "passgate", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, default_value = "passgate.toml")]
    config: PathBuf,

    /// Override the configured log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default verifier configuration.
    Init(commands::init::InitArgs),
    /// Run a full verification against the in-memory capability.
    Verify(commands::verify::VerifyArgs),
    /// Extract and evaluate a result payload offline.
    Evaluate(commands::evaluate::EvaluateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli.command, &cli.config)?;
    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.logging.level),
        &config.logging.format,
    );

    match &cli.command {
        Commands::Init(args) => commands::init::run(args, &cli.config),
        Commands::Verify(args) => commands::verify::run(args, &config).await,
        Commands::Evaluate(args) => commands::evaluate::run(args, &config),
    }
}

/// `init` writes the file rather than reading it, so a broken file must not stop it.
fn load_config(command: &Commands, path: &Path) -> anyhow::Result<VerifierConfig> {
    match command {
        Commands::Init(_) => Ok(VerifierConfig::default()),
        _ => Ok(VerifierConfig::load(path)?),
    }
}

/// Logs go to stderr so command output on stdout stays machine-readable.
fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}
