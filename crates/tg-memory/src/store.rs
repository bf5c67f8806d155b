//! Insertion-ordered memory store with invariant checks and threshold sweeps

use std::collections::HashMap;

use crate::decay::{decay_strength, DecayLaw, S_MAX};
use crate::error::MemoryError;
use crate::record::EntropicMemory;

/// What to do when an inserted id already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Fail with [`MemoryError::DuplicateId`]
    #[default]
    Reject,
    /// Upsert; `force` permits last_accessed_tau to move backwards
    Merge { force: bool },
}

/// Result of an entropy sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepOutcome {
    /// Retained records with their projected strength, in insertion order
    pub survivors: Vec<(EntropicMemory, f64)>,
    /// Evicted records, in insertion order
    pub forgotten: Vec<EntropicMemory>,
}

/// Storage interface for entropic memories
pub trait MemoryStore {
    /// Insert a record under the given collision policy
    fn add(&mut self, record: EntropicMemory, on_collision: CollisionPolicy)
        -> Result<(), MemoryError>;

    fn get(&self, id: &str) -> Option<&EntropicMemory>;

    /// Records in insertion order
    fn records(&self) -> Vec<&EntropicMemory>;

    /// Evict records whose projected strength at `current_tau` is at or
    /// below the prune threshold
    fn sweep(&mut self, current_tau: f64) -> SweepOutcome;

    /// Reconsolidate a record; `None` when the id is unknown
    fn touch(&mut self, id: &str, current_tau: f64, cooldown: f64) -> Option<f64>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`MemoryStore`] that projects decay with a [`DecayLaw`]
#[derive(Debug, Clone)]
pub struct DecayMemoryStore {
    law: DecayLaw,
    prune_threshold: f64,
    s_max: f64,
    records: HashMap<String, EntropicMemory>,
    last_tau: HashMap<String, f64>,
    order: Vec<String>,
}

impl DecayMemoryStore {
    pub fn new(law: DecayLaw, prune_threshold: f64, s_max: f64) -> Result<Self, MemoryError> {
        law.validate()?;
        if !(0.0..=1.0).contains(&prune_threshold) {
            return Err(MemoryError::InvalidConfig(format!(
                "prune_threshold must be within [0.0, 1.0], got {}",
                prune_threshold
            )));
        }
        if !(s_max.is_finite() && s_max > 0.0) {
            return Err(MemoryError::InvalidConfig(format!(
                "s_max must be > 0.0, got {}",
                s_max
            )));
        }
        Ok(Self {
            law,
            prune_threshold,
            s_max,
            records: HashMap::new(),
            last_tau: HashMap::new(),
            order: Vec::new(),
        })
    }

    pub fn law(&self) -> DecayLaw {
        self.law
    }

    pub fn prune_threshold(&self) -> f64 {
        self.prune_threshold
    }

    pub fn s_max(&self) -> f64 {
        self.s_max
    }

    /// Ids in insertion order
    pub fn active_ids(&self) -> &[String] {
        &self.order
    }

    /// Projected strength of `record` at `current_tau`
    pub fn current_strength(&self, record: &EntropicMemory, current_tau: f64) -> f64 {
        decay_strength(
            record.strength,
            current_tau - record.last_accessed_tau,
            self.law,
        )
    }

    fn validate(&self, record: &EntropicMemory, allow_tau_regression: bool) -> Result<(), MemoryError> {
        if !(record.strength.is_finite() && (0.0..=self.s_max).contains(&record.strength)) {
            return Err(MemoryError::StrengthOutOfRange {
                id: record.id.clone(),
                strength: record.strength,
                s_max: self.s_max,
            });
        }
        if let Some(&previous) = self.last_tau.get(&record.id) {
            if !allow_tau_regression && record.last_accessed_tau < previous {
                return Err(MemoryError::TauRegression {
                    id: record.id.clone(),
                    previous,
                    attempted: record.last_accessed_tau,
                });
            }
        }
        Ok(())
    }

    /// Insert or replace while enforcing strength bounds and tau monotonicity
    ///
    /// The record's reconsolidation cap is replaced by the store's `s_max`.
    pub fn upsert(&mut self, mut record: EntropicMemory, allow_tau_regression: bool) -> Result<(), MemoryError> {
        if let Err(e) = self.validate(&record, allow_tau_regression) {
            tracing::warn!(id = %record.id, error = %e, "Rejected memory write");
            return Err(e);
        }
        record.s_max = self.s_max;
        self.last_tau
            .insert(record.id.clone(), record.last_accessed_tau);
        if !self.records.contains_key(&record.id) {
            self.order.push(record.id.clone());
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }
}

impl Default for DecayMemoryStore {
    fn default() -> Self {
        Self {
            law: DecayLaw::default(),
            prune_threshold: 0.2,
            s_max: S_MAX,
            records: HashMap::new(),
            last_tau: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl MemoryStore for DecayMemoryStore {
    fn add(&mut self, record: EntropicMemory, on_collision: CollisionPolicy) -> Result<(), MemoryError> {
        match (self.records.contains_key(&record.id), on_collision) {
            (true, CollisionPolicy::Reject) => {
                tracing::warn!(id = %record.id, "Rejected duplicate memory id");
                Err(MemoryError::DuplicateId(record.id))
            }
            (true, CollisionPolicy::Merge { force }) => self.upsert(record, force),
            (false, _) => self.upsert(record, false),
        }
    }

    fn get(&self, id: &str) -> Option<&EntropicMemory> {
        self.records.get(id)
    }

    fn records(&self) -> Vec<&EntropicMemory> {
        self.order
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    fn sweep(&mut self, current_tau: f64) -> SweepOutcome {
        let mut outcome = SweepOutcome::default();
        let mut retained = Vec::with_capacity(self.order.len());

        for id in self.order.drain(..) {
            let Some(record) = self.records.get(&id) else {
                continue;
            };
            let projected = decay_strength(
                record.strength,
                current_tau - record.last_accessed_tau,
                self.law,
            );
            if projected <= self.prune_threshold {
                if let Some(evicted) = self.records.remove(&id) {
                    self.last_tau.remove(&id);
                    tracing::debug!(id = %id, projected, "Memory forgotten");
                    outcome.forgotten.push(evicted);
                }
            } else {
                outcome.survivors.push((record.clone(), projected));
                retained.push(id);
            }
        }

        self.order = retained;
        outcome
    }

    fn touch(&mut self, id: &str, current_tau: f64, cooldown: f64) -> Option<f64> {
        let record = self.records.get_mut(id)?;
        let strength = record.reconsolidate(current_tau, cooldown);
        self.last_tau
            .insert(id.to_string(), record.last_accessed_tau);
        Some(strength)
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}
