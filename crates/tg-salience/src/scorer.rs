//! The narrow scorer capability shared by every novelty and value variant

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::error::SalienceError;

/// Numeric diagnostics emitted by a scorer (sorted for deterministic iteration)
pub type Diagnostics = BTreeMap<String, f64>;

/// String provenance emitted by a scorer; enough to reproduce its output exactly
pub type Provenance = BTreeMap<String, String>;

/// Result of scoring one text
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    /// Component value, expected in [0, 1]
    pub value: f64,
    /// Unprefixed diagnostic metrics
    pub diagnostics: Diagnostics,
    /// Unprefixed provenance entries
    pub provenance: Provenance,
}

impl Score {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            diagnostics: Diagnostics::new(),
            provenance: Provenance::new(),
        }
    }

    pub fn with_diagnostic(mut self, key: &str, value: f64) -> Self {
        self.diagnostics.insert(key.to_string(), value);
        self
    }

    pub fn with_provenance(mut self, key: &str, value: impl Into<String>) -> Self {
        self.provenance.insert(key.to_string(), value.into());
        self
    }
}

/// A salience component scorer.
///
/// Implementations keep configuration and rolling runtime state in separate
/// fields. [`Scorer::reset`] clears only the runtime state, so replaying the
/// same inputs after a reset reproduces the same scores and provenance.
pub trait Scorer: Debug {
    /// Stable method name recorded in provenance
    fn method(&self) -> &'static str;

    /// Score one text, advancing any rolling history
    fn score(&mut self, text: &str) -> Result<Score, SalienceError>;

    /// Clear rolling history; configuration is untouched
    fn reset(&mut self);
}

/// Clamp into the unit interval, mapping NaN to 0
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.5), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(0.25), 0.25);
        assert_eq!(clamp_unit(f64::NAN), 0.0);
    }

    #[test]
    fn test_score_builder() {
        let score = Score::new(0.4)
            .with_diagnostic("hits", 2.0)
            .with_provenance("method", "keyword");
        assert_eq!(score.diagnostics["hits"], 2.0);
        assert_eq!(score.provenance["method"], "keyword");
    }
}
