//! tg - command-line interface for Temporal Gradient runs
//!
//! # Usage
//!
//! ```bash
//! # Run the simulation loop over a file of events (one per line)
//! tg simulate events.txt
//!
//! # Emit packets as JSON lines instead of a table
//! tg simulate events.txt --json
//!
//! # Calibration summary with a custom config
//! tg --config tg.yaml calibrate
//!
//! # Validate telemetry packets against the closed schema
//! tg validate packets.jsonl --require-provenance-hash
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tg_runtime::TemporalGradientConfig;

mod commands;

use commands::{calibrate, simulate, validate};

/// Temporal Gradient - salience-modulated internal time for agents
#[derive(Parser)]
#[command(
    name = "tg",
    version,
    about = "Temporal Gradient CLI",
    long_about = "Runs the salience -> clock -> memory -> telemetry loop deterministically.\n\n\
                  Configuration comes from --config (YAML, TOML or JSON) plus\n\
                  TG__<SECTION>__<KEY> environment overrides."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation loop over an events file
    #[command(name = "simulate")]
    Simulate(simulate::SimulateArgs),

    /// Run the calibration harness
    #[command(name = "calibrate")]
    Calibrate(calibrate::CalibrateArgs),

    /// Validate telemetry packets
    #[command(name = "validate")]
    Validate(validate::ValidateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tg_runtime::init_tracing(cli.verbose);

    let config = TemporalGradientConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Simulate(args) => simulate::run(args, config),
        Commands::Calibrate(args) => calibrate::run(args, config),
        Commands::Validate(args) => validate::run(args, config),
    }
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message with an X
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}
