//! Calibration harness: a fixed event list, an idle post-sweep tick, and a
//! rounded summary suitable for regression fixtures.

use serde::{Deserialize, Serialize};
use tg_telemetry::round_to;

use crate::config::TemporalGradientConfig;
use crate::error::RuntimeError;
use crate::simulation::Simulation;

pub const CALIBRATION_EVENTS: [&str; 6] = [
    "Boot sequence initiated.",
    "Operator note: check coolant levels.",
    "CRITICAL: magnetic field instability detected.",
    "Routine telemetry sweep complete.",
    "Never override the pressure relief protocol.",
    "System idle. Monitoring continues.",
];

const PLACES: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CalibrationReport {
    pub salience_mean: f64,
    pub salience_median: f64,
    pub clock_rate_min: f64,
    pub clock_rate_max: f64,
    /// Memories still stored after the sweep
    pub memory_count: usize,
    pub memory_survivors: usize,
    pub memory_pruned: usize,
    pub tau: f64,
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Run the harness over `events`
pub fn run_calibration<S: AsRef<str>>(
    config: &TemporalGradientConfig,
    events: &[S],
) -> Result<CalibrationReport, RuntimeError> {
    if events.is_empty() {
        return Err(RuntimeError::EmptyRun);
    }
    let mut sim = Simulation::new(config.clone())?;
    for text in events {
        sim.step(text.as_ref())?;
    }
    sim.idle(config.policies.calibration_post_sweep_wall_delta)?;
    let outcome = sim.sweep();

    let psi: Vec<f64> = sim.events().iter().map(|e| e.components.psi).collect();
    let summary = sim.summary();

    let report = CalibrationReport {
        salience_mean: round_to(summary.psi_mean, PLACES),
        salience_median: round_to(median(&psi), PLACES),
        clock_rate_min: round_to(summary.clock_rate_min, PLACES),
        clock_rate_max: round_to(summary.clock_rate_max, PLACES),
        memory_count: sim.engine().len(),
        memory_survivors: outcome.survivors.len(),
        memory_pruned: outcome.forgotten.len(),
        tau: round_to(sim.tau(), PLACES),
    };
    tracing::info!(?report, "Calibration complete");
    Ok(report)
}

/// Run the harness over [`CALIBRATION_EVENTS`]
pub fn run_default_calibration(config: &TemporalGradientConfig) -> Result<CalibrationReport, RuntimeError> {
    run_calibration(config, &CALIBRATION_EVENTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_calibration_is_reproducible() {
        let config = TemporalGradientConfig::default();
        let first = run_default_calibration(&config).unwrap();
        let second = run_default_calibration(&config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.memory_count, first.memory_survivors);
        assert!(first.clock_rate_min <= first.clock_rate_max);
        assert!(first.clock_rate_max <= 1.0);
    }

    #[test]
    fn test_idle_tick_counts_toward_tau() {
        let mut config = TemporalGradientConfig::default();
        let short = run_default_calibration(&config).unwrap();
        config.policies.calibration_post_sweep_wall_delta = 10.0;
        let long = run_default_calibration(&config).unwrap();
        assert!((long.tau - short.tau - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_report_keys() {
        let report = run_default_calibration(&TemporalGradientConfig::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        for key in ["SALIENCE_MEAN", "CLOCK_RATE_MIN", "MEMORY_PRUNED", "TAU"] {
            assert!(json.get(key).is_some(), "{}", key);
        }
    }

    #[test]
    fn test_empty_events() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            run_calibration(&TemporalGradientConfig::default(), &empty),
            Err(RuntimeError::EmptyRun)
        ));
    }
}
