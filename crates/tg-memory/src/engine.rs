//! Decay engine facade over a [`MemoryStore`]

use crate::decay::{DecayLaw, S_MAX};
use crate::error::MemoryError;
use crate::record::EntropicMemory;
use crate::store::{CollisionPolicy, DecayMemoryStore, MemoryStore, SweepOutcome};

/// Stamps records with the current tau and applies decay and pruning
#[derive(Debug, Clone, Default)]
pub struct DecayEngine {
    store: DecayMemoryStore,
}

impl DecayEngine {
    pub fn new(law: DecayLaw, prune_threshold: f64, s_max: f64) -> Result<Self, MemoryError> {
        Ok(Self {
            store: DecayMemoryStore::new(law, prune_threshold, s_max)?,
        })
    }

    /// Half-life engine with the default strength ceiling
    pub fn with_half_life(half_life: f64, prune_threshold: f64) -> Result<Self, MemoryError> {
        Self::new(DecayLaw::HalfLife(half_life), prune_threshold, S_MAX)
    }

    pub fn law(&self) -> DecayLaw {
        self.store.law()
    }

    pub fn prune_threshold(&self) -> f64 {
        self.store.prune_threshold()
    }

    /// Add a record created at `current_tau`, rejecting duplicate ids
    pub fn add_memory(&mut self, record: EntropicMemory, current_tau: f64) -> Result<(), MemoryError> {
        self.add_memory_with(record, current_tau, CollisionPolicy::Reject)
    }

    /// Add a record created at `current_tau` under an explicit collision policy
    pub fn add_memory_with(
        &mut self,
        mut record: EntropicMemory,
        current_tau: f64,
        on_collision: CollisionPolicy,
    ) -> Result<(), MemoryError> {
        record.created_at_tau = current_tau;
        record.last_accessed_tau = current_tau;
        tracing::debug!(id = %record.id, strength = record.strength, tau = current_tau, "Encoding memory");
        self.store.add(record, on_collision)
    }

    pub fn get_memory(&self, id: &str) -> Option<&EntropicMemory> {
        self.store.get(id)
    }

    /// Reconsolidate on access; `None` when the id is unknown
    pub fn touch_memory(&mut self, id: &str, current_tau: f64, cooldown: f64) -> Option<f64> {
        self.store.touch(id, current_tau, cooldown)
    }

    /// Projected strength of `record` at `current_tau`
    pub fn current_strength(&self, record: &EntropicMemory, current_tau: f64) -> f64 {
        self.store.current_strength(record, current_tau)
    }

    /// Prune weak memories and return survivors with their projected strength
    pub fn entropy_sweep(&mut self, current_tau: f64) -> SweepOutcome {
        let outcome = self.store.sweep(current_tau);
        if !outcome.forgotten.is_empty() {
            tracing::info!(
                forgotten = outcome.forgotten.len(),
                survivors = outcome.survivors.len(),
                tau = current_tau,
                "Entropy sweep pruned memories"
            );
        }
        outcome
    }

    /// Live records in insertion order
    pub fn memories(&self) -> Vec<&EntropicMemory> {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stamps_tau() {
        let mut engine = DecayEngine::with_half_life(10.0, 0.2).unwrap();
        let mut record = EntropicMemory::with_id("m1", "event", 1.0);
        record.created_at_tau = 99.0;
        engine.add_memory(record, 3.0).unwrap();

        let stored = engine.get_memory("m1").unwrap();
        assert_eq!(stored.created_at_tau, 3.0);
        assert_eq!(stored.last_accessed_tau, 3.0);
    }

    #[test]
    fn test_one_half_life_sweep() {
        let mut engine = DecayEngine::with_half_life(10.0, 0.2).unwrap();
        engine
            .add_memory(EntropicMemory::with_id("m1", "event", 1.2), 0.0)
            .unwrap();
        let outcome = engine.entropy_sweep(10.0);
        assert_eq!(outcome.survivors.len(), 1);
        assert_eq!(outcome.survivors[0].1, 0.6);
        assert_eq!(engine.get_memory("m1").unwrap().strength, 1.2);
    }

    #[test]
    fn test_touch_delays_decay() {
        let mut engine = DecayEngine::with_half_life(10.0, 0.2).unwrap();
        engine
            .add_memory(EntropicMemory::with_id("m1", "event", 0.5), 0.0)
            .unwrap();
        engine.touch_memory("m1", 10.0, 0.0).unwrap();

        let record = engine.get_memory("m1").unwrap().clone();
        assert!((engine.current_strength(&record, 10.0) - 0.55).abs() < 1e-12);
        assert_eq!(engine.entropy_sweep(10.0).survivors.len(), 1);
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut engine = DecayEngine::default();
        engine
            .add_memory(EntropicMemory::with_id("m1", "a", 0.5), 0.0)
            .unwrap();
        assert_eq!(
            engine.add_memory(EntropicMemory::with_id("m1", "b", 0.5), 1.0),
            Err(MemoryError::DuplicateId("m1".into()))
        );
        engine
            .add_memory_with(
                EntropicMemory::with_id("m1", "b", 0.7),
                1.0,
                CollisionPolicy::Merge { force: false },
            )
            .unwrap();
        assert_eq!(engine.memories()[0].content, "b");
    }
}
