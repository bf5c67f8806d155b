//! Simulate command - run the loop over an events file
//!
//! Usage:
//! ```bash
//! tg simulate events.txt
//! tg simulate events.txt --json > packets.jsonl
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tg_runtime::{Simulation, TemporalGradientConfig};

/// Arguments for the simulate command
#[derive(Args)]
pub struct SimulateArgs {
    /// Text file with one event per line; blank lines and `#` comments are skipped
    #[arg(value_name = "FILE")]
    events: PathBuf,

    /// Print packets as JSON lines instead of a table
    #[arg(long)]
    json: bool,
}

pub(crate) fn read_events(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events file: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Run the simulate command
pub fn run(args: SimulateArgs, config: TemporalGradientConfig) -> Result<()> {
    let events = read_events(&args.events)?;
    let report = Simulation::new(config)?
        .run(&events)
        .context("Simulation failed")?;

    if args.json {
        for packet in report.packets() {
            println!("{}", packet.to_json()?);
        }
        return Ok(());
    }

    println!("{}", "Temporal Gradient Simulation".bold().cyan());
    println!("{}", "═".repeat(78).cyan());
    println!(
        "{:<6} {:<8} {:<36} {:<6} {:<7} {}",
        "WALL", "TAU", "EVENT", "PSI", "RATE", "MEMORY"
    );
    for event in &report.events {
        let memory = match &event.encoded {
            Some(id) => id.green().to_string(),
            None => "-".dimmed().to_string(),
        };
        println!(
            "{:<6.2} {:<8.2} {:<36} {:<6.3} {:<7.4} {}",
            event.packet.wall_t,
            event.packet.tau,
            truncate(&event.text, 36),
            event.packet.salience,
            event.packet.clock_rate,
            memory
        );
    }

    println!();
    println!("{}", "Memory audit".bold());
    for (memory, strength) in &report.survivors {
        println!(
            "  {} {:.2}  {}",
            "[ALIVE] ".green().bold(),
            strength,
            truncate(&memory.content, 60)
        );
    }
    for memory in &report.forgotten {
        println!("  {} {}", "[PRUNED]".red().bold(), truncate(&memory.content, 60));
    }

    let s = &report.summary;
    println!();
    println!("  {} {}", "Events:".dimmed(), s.events);
    println!(
        "  {} min {:.3} / mean {:.3} / max {:.3}",
        "Psi:".dimmed(),
        s.psi_min,
        s.psi_mean,
        s.psi_max
    );
    println!(
        "  {} min {:.4} / mean {:.4} / max {:.4}",
        "Clock rate:".dimmed(),
        s.clock_rate_min,
        s.clock_rate_mean,
        s.clock_rate_max
    );
    println!(
        "  {} {:.4} (wall {:.2})",
        "Tau:".dimmed(),
        s.tau_final,
        s.wall_final
    );
    println!(
        "  {} {} written, {} alive",
        "Memories:".dimmed(),
        s.memories_written,
        s.memories_alive
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_events_skips_blanks_and_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header\nfirst event\n\n  second event  \n").unwrap();
        let events = read_events(file.path()).unwrap();
        assert_eq!(events, vec!["first event", "second event"]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
