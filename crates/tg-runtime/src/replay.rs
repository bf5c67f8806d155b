//! Replay verification between runs
//!
//! Strict invariants (event order, emitted SALIENCE, provenance hashes) must
//! match exactly. Numeric diagnostics must match exactly too, unless a key is
//! given a tolerance or is allowlisted as unstable with a written rationale.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::RuntimeError;
use crate::simulation::EventRecord;

/// Sequences a replay must reproduce exactly
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayExpectation {
    pub event_order: Vec<String>,
    pub salience: Vec<f64>,
    pub provenance_hashes: Vec<String>,
}

impl ReplayExpectation {
    /// Capture the expectation from a baseline run
    pub fn from_events(events: &[EventRecord]) -> Self {
        Self {
            event_order: events.iter().map(|e| e.text.clone()).collect(),
            salience: events.iter().map(|e| e.packet.salience).collect(),
            provenance_hashes: events
                .iter()
                .map(|e| e.packet.provenance_hash.clone().unwrap_or_default())
                .collect(),
        }
    }
}

fn mismatch(what: &str, index: usize, expected: impl std::fmt::Debug, actual: impl std::fmt::Debug) -> RuntimeError {
    RuntimeError::ReplayMismatch(format!(
        "{} differs at event {}: expected {:?}, got {:?}",
        what, index, expected, actual
    ))
}

/// Check event order, SALIENCE and provenance hashes against an expectation
pub fn assert_strict_invariants(
    events: &[EventRecord],
    expected: &ReplayExpectation,
) -> Result<(), RuntimeError> {
    let actual = ReplayExpectation::from_events(events);
    for (what, len) in [
        ("event order", expected.event_order.len()),
        ("salience", expected.salience.len()),
        ("provenance hashes", expected.provenance_hashes.len()),
    ] {
        if len != events.len() {
            return Err(RuntimeError::ReplayMismatch(format!(
                "{} length {} does not match {} events",
                what,
                len,
                events.len()
            )));
        }
    }

    for (i, (want, got)) in expected.event_order.iter().zip(&actual.event_order).enumerate() {
        if want != got {
            return Err(mismatch("event order", i, want, got));
        }
    }
    for (i, (want, got)) in expected.salience.iter().zip(&actual.salience).enumerate() {
        if want != got {
            return Err(mismatch("SALIENCE", i, want, got));
        }
    }
    for (i, (want, got)) in expected
        .provenance_hashes
        .iter()
        .zip(&actual.provenance_hashes)
        .enumerate()
    {
        if want != got {
            return Err(mismatch("PROVENANCE_HASH", i, want, got));
        }
    }
    Ok(())
}

/// How strictly diagnostics are compared across runs
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsPolicy {
    pub tolerance_keys: BTreeSet<String>,
    pub abs_tol: f64,
    pub rel_tol: f64,
    /// Key -> rationale; these keys are not compared
    pub allowed_unstable: BTreeMap<String, String>,
}

impl Default for DiagnosticsPolicy {
    fn default() -> Self {
        Self {
            tolerance_keys: BTreeSet::new(),
            abs_tol: 1e-9,
            rel_tol: 1e-9,
            allowed_unstable: BTreeMap::new(),
        }
    }
}

impl DiagnosticsPolicy {
    pub fn with_tolerance(mut self, key: &str) -> Self {
        self.tolerance_keys.insert(key.to_string());
        self
    }

    pub fn allow_unstable(mut self, key: &str, rationale: &str) -> Self {
        self.allowed_unstable
            .insert(key.to_string(), rationale.to_string());
        self
    }

    fn validate(&self) -> Result<(), RuntimeError> {
        for (key, rationale) in &self.allowed_unstable {
            if key.trim().is_empty() {
                return Err(RuntimeError::InvalidPolicy(
                    "unstable metric key must be non-empty".to_string(),
                ));
            }
            if rationale.trim().is_empty() {
                return Err(RuntimeError::InvalidPolicy(format!(
                    "unstable metric {:?} requires a non-empty rationale",
                    key
                )));
            }
        }
        Ok(())
    }

    fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= (self.rel_tol * a.abs().max(b.abs())).max(self.abs_tol)
    }

    /// Compare each run's diagnostics to the first run's
    pub fn check(&self, runs: &[&[EventRecord]]) -> Result<(), RuntimeError> {
        self.validate()?;
        let Some((baseline, rest)) = runs.split_first() else {
            return Err(RuntimeError::InvalidPolicy(
                "at least one run is required".to_string(),
            ));
        };

        for candidate in rest {
            if candidate.len() != baseline.len() {
                return Err(RuntimeError::ReplayMismatch(format!(
                    "run length {} does not match baseline {}",
                    candidate.len(),
                    baseline.len()
                )));
            }
            for (i, (base, cand)) in baseline.iter().zip(candidate.iter()).enumerate() {
                let base_diag = &base.components.diagnostics;
                let cand_diag = &cand.components.diagnostics;
                if !base_diag.keys().eq(cand_diag.keys()) {
                    return Err(mismatch(
                        "diagnostic keys",
                        i,
                        base_diag.keys().collect::<Vec<_>>(),
                        cand_diag.keys().collect::<Vec<_>>(),
                    ));
                }
                for (key, base_val) in base_diag {
                    if self.allowed_unstable.contains_key(key) {
                        continue;
                    }
                    let cand_val = cand_diag[key];
                    let same = if self.tolerance_keys.contains(key) {
                        self.close(*base_val, cand_val)
                    } else {
                        *base_val == cand_val
                    };
                    if !same {
                        return Err(RuntimeError::ReplayMismatch(format!(
                            "diagnostics metric {:?} drifted at event {}: {} vs {}; \
                             allowlist it with a rationale if instability is expected",
                            key, i, base_val, cand_val
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemporalGradientConfig;
    use crate::simulation::Simulation;

    const EVENTS: [&str; 3] = [
        "stop the coolant pump",
        "routine inspection logged",
        "never bypass the interlock",
    ];

    fn run() -> Vec<EventRecord> {
        Simulation::new(TemporalGradientConfig::default())
            .unwrap()
            .run(EVENTS)
            .unwrap()
            .events
    }

    #[test]
    fn test_identical_runs_pass() {
        let first = run();
        let second = run();
        assert_strict_invariants(&second, &ReplayExpectation::from_events(&first)).unwrap();
        DiagnosticsPolicy::default()
            .check(&[&first, &second])
            .unwrap();
    }

    #[test]
    fn test_salience_drift_detected() {
        let first = run();
        let mut expected = ReplayExpectation::from_events(&first);
        expected.salience[1] += 0.001;
        let err = assert_strict_invariants(&first, &expected).unwrap_err();
        assert!(err.to_string().contains("SALIENCE"));

        let mut expected = ReplayExpectation::from_events(&first);
        expected.provenance_hashes.pop();
        assert!(assert_strict_invariants(&first, &expected).is_err());
    }

    #[test]
    fn test_diagnostic_drift_requires_allowlist() {
        let first = run();
        let mut second = run();
        let key = second[0]
            .components
            .diagnostics
            .keys()
            .next()
            .unwrap()
            .clone();
        *second[0].components.diagnostics.get_mut(&key).unwrap() += 0.5;

        let err = DiagnosticsPolicy::default()
            .check(&[&first, &second])
            .unwrap_err();
        assert!(err.to_string().contains(&key));

        DiagnosticsPolicy::default()
            .allow_unstable(&key, "judge-backed estimate varies by runtime")
            .check(&[&first, &second])
            .unwrap();
    }

    #[test]
    fn test_tolerance_keys() {
        let first = run();
        let mut second = run();
        let key = second[0]
            .components
            .diagnostics
            .keys()
            .next()
            .unwrap()
            .clone();
        *second[0].components.diagnostics.get_mut(&key).unwrap() += 1e-12;

        assert!(DiagnosticsPolicy::default().check(&[&first, &second]).is_err());
        DiagnosticsPolicy::default()
            .with_tolerance(&key)
            .check(&[&first, &second])
            .unwrap();
    }

    #[test]
    fn test_unstable_entry_needs_rationale() {
        let first = run();
        let result = DiagnosticsPolicy::default()
            .allow_unstable("H_jaccard_max", " ")
            .check(&[&first]);
        assert!(matches!(result, Err(RuntimeError::InvalidPolicy(_))));
    }
}
