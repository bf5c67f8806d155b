//! Composite salience: psi = clamp(H x V, 0, 1)

use serde::Serialize;

use crate::error::SalienceError;
use crate::provenance::{compute_provenance_hash, HashParams};
use crate::scorer::{clamp_unit, Diagnostics, Provenance, Scorer};

/// Output of one pipeline evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalienceComponents {
    /// Novelty component H
    pub novelty: f64,
    /// Value component V
    pub value: f64,
    /// Composite salience load
    pub psi: f64,
    /// Scorer diagnostics under `H_` / `V_` prefixes
    pub diagnostics: Diagnostics,
    /// Scorer provenance under `H_` / `V_` prefixes
    pub provenance: Provenance,
}

impl SalienceComponents {
    /// Flat numeric view: H, V, psi plus every diagnostic
    pub fn telemetry_map(&self) -> Diagnostics {
        let mut map = self.diagnostics.clone();
        map.insert("H".to_string(), self.novelty);
        map.insert("V".to_string(), self.value);
        map.insert("psi".to_string(), self.psi);
        map
    }

    /// Stable hash of this evaluation's provenance (role "pipeline")
    pub fn provenance_hash(&self) -> Result<String, SalienceError> {
        compute_provenance_hash(&self.provenance, HashParams::default())
    }
}

/// Composes one novelty scorer and one value scorer
#[derive(Debug)]
pub struct SaliencePipeline {
    novelty: Box<dyn Scorer>,
    value: Box<dyn Scorer>,
}

fn merge_prefixed<V: Clone>(
    target: &mut std::collections::BTreeMap<String, V>,
    prefix: &str,
    source: &std::collections::BTreeMap<String, V>,
) {
    for (key, val) in source {
        target.insert(format!("{}{}", prefix, key), val.clone());
    }
}

impl SaliencePipeline {
    pub fn new(novelty: Box<dyn Scorer>, value: Box<dyn Scorer>) -> Self {
        Self { novelty, value }
    }

    /// Score one event. Both components and their product are clamped to [0, 1].
    pub fn evaluate(&mut self, text: &str) -> Result<SalienceComponents, SalienceError> {
        let novelty = self.novelty.score(text)?;
        let value = self.value.score(text)?;

        let h = clamp_unit(novelty.value);
        let v = clamp_unit(value.value);
        let psi = clamp_unit(h * v);

        let mut diagnostics = Diagnostics::new();
        merge_prefixed(&mut diagnostics, "H_", &novelty.diagnostics);
        merge_prefixed(&mut diagnostics, "V_", &value.diagnostics);

        let mut provenance = Provenance::new();
        merge_prefixed(&mut provenance, "H_", &novelty.provenance);
        merge_prefixed(&mut provenance, "V_", &value.provenance);

        tracing::trace!(h, v, psi, "Evaluated salience");

        Ok(SalienceComponents {
            novelty: h,
            value: v,
            psi,
            diagnostics,
            provenance,
        })
    }

    /// Clear rolling scorer history; configuration is never touched
    pub fn reset(&mut self) {
        self.novelty.reset();
        self.value.reset();
    }
}
