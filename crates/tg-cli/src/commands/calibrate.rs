//! Calibrate command - fixed-event harness with a sorted JSON summary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tg_runtime::{run_calibration, run_default_calibration, TemporalGradientConfig};

use super::simulate::read_events;

/// Arguments for the calibrate command
#[derive(Args)]
pub struct CalibrateArgs {
    /// Replace the built-in event list with a file (one event per line)
    #[arg(long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// Pretty-print the summary
    #[arg(long)]
    pretty: bool,
}

/// Run the calibrate command
pub fn run(args: CalibrateArgs, config: TemporalGradientConfig) -> Result<()> {
    let report = match &args.events {
        Some(path) => run_calibration(&config, read_events(path)?.as_slice()),
        None => run_default_calibration(&config),
    }
    .context("Calibration failed")?;

    // Value maps serialize with sorted keys
    let value = serde_json::to_value(&report)?;
    let out = if args.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    println!("{}", out);
    Ok(())
}
