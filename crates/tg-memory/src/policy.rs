//! Cooldown gating in internal time

use serde::{Deserialize, Serialize};

/// Allows compute (encoding, reconsolidation) once enough tau has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CooldownPolicy {
    pub cooldown_tau: f64,
}

impl CooldownPolicy {
    pub fn new(cooldown_tau: f64) -> Self {
        Self { cooldown_tau }
    }

    /// True iff `elapsed_tau >= cooldown_tau`
    pub fn allows_compute(&self, elapsed_tau: f64) -> bool {
        elapsed_tau >= self.cooldown_tau
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_compute_boundary() {
        let policy = CooldownPolicy::new(2.0);
        assert!(!policy.allows_compute(1.999));
        assert!(policy.allows_compute(2.0));
        assert!(policy.allows_compute(5.0));
    }

    #[test]
    fn test_zero_cooldown_always_allows() {
        assert!(CooldownPolicy::default().allows_compute(0.0));
    }
}
