//! `passgate init`: write a default verifier configuration.

use clap::Args;
use std::path::Path;

use passgate_core::VerifierConfig;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path) -> anyhow::Result<()> {
    if config_path.exists() && !args.force {
        anyhow::bail!(
            "configuration file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    VerifierConfig::default().save(config_path)?;
    tracing::info!(path = %config_path.display(), "wrote default config");

    println!("Initialized Passgate verifier config at {}", config_path.display());
    println!("Edit it to set the display name, QR options, and minimum age.");
    println!("Run 'passgate verify --kind age' to try a verification.");
    Ok(())
}
