//! CLI entrypoint for accord
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod demo;

use anyhow::Result;
use clap::{Parser, Subcommand};
use accord_infrastructure::ConfigLoader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "accord", version, about = "Round-based decision-alignment coordination core")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Explicit config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ignore all config files and use built-in defaults
    #[arg(long, global = true)]
    no_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive a complete two-party workflow against the in-memory stack
    Demo,
    /// Load, validate, and print the effective configuration
    ConfigCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };
    config.validate()?;
    info!("configuration loaded");

    match cli.command {
        Command::Demo => demo::run(&config).await,
        Command::ConfigCheck => {
            ConfigLoader::print_config_sources();
            println!();
            println!("Effective configuration:");
            println!("  invites.ttl_days               = {}", config.invites.ttl_days);
            println!("  invites.max_uses               = {}", config.invites.max_uses);
            println!(
                "  invites.join_attempts_per_hour = {}",
                config.invites.join_attempts_per_hour
            );
            println!("  invites.join_url_base          = {}", config.invites.join_url_base);
            println!("  synthesizer.kind               = {}", config.synthesizer.kind);
            println!(
                "  synthesizer.timeout_seconds    = {}",
                config.synthesizer.timeout_seconds
            );
            println!("  synthesizer.retry_budget       = {}", config.synthesizer.retry_budget);
            println!(
                "  crypto.token_key               = {}",
                if config.crypto.token_key.is_some() {
                    "[set]"
                } else {
                    "[unset, per-process key]"
                }
            );
            println!("  logging.level                  = {}", config.logging.level);
            println!();
            println!("Configuration is valid.");
            Ok(())
        }
    }
}
