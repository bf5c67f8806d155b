//! Validate command - check packets against the closed telemetry schema
//!
//! Accepts a single JSON object, a JSON array of objects, or JSON lines.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use tg_runtime::TemporalGradientConfig;
use tg_telemetry::{ChronometricVector, PacketMode, SchemaOptions};

use crate::{print_error, print_success};

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// Packet file
    #[arg(value_name = "FILE")]
    packets: PathBuf,

    /// Decode with legacy-density key aliases instead of the canonical schema
    #[arg(long)]
    legacy: bool,

    /// Require a non-empty PROVENANCE_HASH (also enabled by policies.replay_require_provenance_hash)
    #[arg(long)]
    require_provenance_hash: bool,

    /// Check CLOCK_RATE against the configured min/max clock rate
    #[arg(long)]
    clock_rate_bounds: bool,
}

fn parse_packets(content: &str) -> Result<Vec<Value>> {
    if let Ok(value) = serde_json::from_str::<Value>(content) {
        return Ok(match value {
            Value::Array(items) => items,
            other => vec![other],
        });
    }
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).with_context(|| format!("Line {} is not valid JSON", i + 1))
        })
        .collect()
}

/// Run the validate command
pub fn run(args: ValidateArgs, config: TemporalGradientConfig) -> Result<()> {
    let content = std::fs::read_to_string(&args.packets)
        .with_context(|| format!("Failed to read packet file: {}", args.packets.display()))?;
    let packets = parse_packets(&content)?;

    let mut options: SchemaOptions = config.schema_options();
    if args.require_provenance_hash {
        options = options.require_provenance_hash();
    }
    if args.clock_rate_bounds {
        options = options.with_clock_rate_bounds(config.clock.min_clock_rate, config.clock.max_clock_rate);
    }
    let mode = if args.legacy {
        PacketMode::LegacyDensity
    } else {
        PacketMode::Canonical
    };

    let mut failures = 0usize;
    for (i, packet) in packets.iter().enumerate() {
        if let Err(e) = ChronometricVector::from_value(packet, mode, &options) {
            print_error(&format!("Packet {}: {}", i + 1, e));
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} of {} packets failed validation", failures, packets.len());
    }
    print_success(&format!("{} packets valid", packets.len()));
    Ok(())
}
