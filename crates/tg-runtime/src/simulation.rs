//! Deterministic simulation loop
//!
//! Per event: score salience, tick the clock with an explicit wall delta,
//! encode a memory when psi clears the threshold and the cooldown allows it,
//! then emit a validated telemetry packet.

use serde::Serialize;
use sha2::{Digest, Sha256};

use tg_clock::{ClockRateModulator, TickRecord};
use tg_memory::{
    initial_strength_from_psi, should_encode, CooldownPolicy, DecayEngine, EntropicMemory,
    SweepOutcome,
};
use tg_salience::{SalienceComponents, SaliencePipeline};
use tg_telemetry::{ChronometricVector, TelemetryPacket};

use crate::config::TemporalGradientConfig;
use crate::error::RuntimeError;

/// Stable memory id for the `index`-th event of a run seeded with `seed`
pub fn memory_id(seed: u64, index: usize) -> String {
    let digest = Sha256::digest(format!("{}:{}", seed, index).as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Everything produced for one event
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub index: usize,
    pub text: String,
    pub components: SalienceComponents,
    pub tick: TickRecord,
    /// Id of the memory written for this event, if any
    pub encoded: Option<String>,
    pub packet: TelemetryPacket,
}

/// Aggregate statistics over a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub events: usize,
    pub psi_min: f64,
    pub psi_max: f64,
    pub psi_mean: f64,
    pub clock_rate_min: f64,
    pub clock_rate_max: f64,
    pub clock_rate_mean: f64,
    pub tau_final: f64,
    pub wall_final: f64,
    pub memories_written: usize,
    pub memories_alive: usize,
}

/// Result of a complete run, including the final sweep
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub events: Vec<EventRecord>,
    pub survivors: Vec<(EntropicMemory, f64)>,
    pub forgotten: Vec<EntropicMemory>,
    pub summary: Summary,
}

impl RunReport {
    pub fn packets(&self) -> impl Iterator<Item = &TelemetryPacket> {
        self.events.iter().map(|e| &e.packet)
    }
}

// Empty input yields 0.0
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn min_max(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

/// Owns every piece of mutable state for one run
pub struct Simulation {
    config: TemporalGradientConfig,
    pipeline: SaliencePipeline,
    clock: ClockRateModulator,
    engine: DecayEngine,
    cooldown: CooldownPolicy,
    last_encode_tau: Option<f64>,
    memories_written: usize,
    events: Vec<EventRecord>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tau", &self.clock.tau())
            .field("events", &self.events.len())
            .field("memories", &self.engine.len())
            .finish()
    }
}

impl Simulation {
    /// Build with the configured token-overlap and keyword scorers
    pub fn new(config: TemporalGradientConfig) -> Result<Self, RuntimeError> {
        let pipeline = config.salience_pipeline()?;
        Self::with_pipeline(config, pipeline)
    }

    /// Build with a caller-supplied salience pipeline
    pub fn with_pipeline(
        config: TemporalGradientConfig,
        pipeline: SaliencePipeline,
    ) -> Result<Self, RuntimeError> {
        config.validate()?;
        let clock = ClockRateModulator::new(config.clock_config())?;
        let engine = config.decay_engine()?;
        let cooldown = CooldownPolicy::new(config.policies.cooldown_tau);
        Ok(Self {
            config,
            pipeline,
            clock,
            engine,
            cooldown,
            last_encode_tau: None,
            memories_written: 0,
            events: Vec::new(),
        })
    }

    pub fn config(&self) -> &TemporalGradientConfig {
        &self.config
    }

    pub fn clock(&self) -> &ClockRateModulator {
        &self.clock
    }

    pub fn engine(&self) -> &DecayEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DecayEngine {
        &mut self.engine
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn tau(&self) -> f64 {
        self.clock.tau()
    }

    fn encode_allowed(&self, tau: f64) -> bool {
        match self.last_encode_tau {
            None => true,
            Some(last) => self.cooldown.allows_compute(tau - last),
        }
    }

    /// Process one event
    pub fn step(&mut self, text: &str) -> Result<&EventRecord, RuntimeError> {
        let index = self.events.len();
        let components = self.pipeline.evaluate(text)?;
        let tick = self
            .clock
            .tick(components.psi, Some(self.config.policies.event_wall_delta))?;

        let mut encoded = None;
        let mut memory_strength = 0.0;
        if should_encode(components.psi, self.config.memory.encode_threshold)
            && self.encode_allowed(tick.tau)
        {
            let strength =
                initial_strength_from_psi(components.psi, self.config.memory.initial_strength_max);
            let id = memory_id(self.config.policies.deterministic_seed, index);
            self.engine
                .add_memory(EntropicMemory::with_id(id.clone(), text, strength), tick.tau)?;
            self.last_encode_tau = Some(tick.tau);
            self.memories_written += 1;
            memory_strength = strength;
            encoded = Some(id);
        }

        let packet = ChronometricVector::new(self.clock.wall_elapsed(), tick.tau, components.psi)
            .with_clock_rate(tick.clock_rate)
            .with_memory_strength(memory_strength)
            .with_components(components.novelty, components.value)
            .with_provenance_hash(components.provenance_hash()?)
            .to_packet()?;
        packet.validate(&self.config.schema_options())?;

        tracing::debug!(
            index,
            psi = components.psi,
            tau = tick.tau,
            encoded = encoded.is_some(),
            "Event processed"
        );

        self.events.push(EventRecord {
            index,
            text: text.to_string(),
            components,
            tick,
            encoded,
            packet,
        });
        let last = self.events.len() - 1;
        Ok(&self.events[last])
    }

    /// Advance the clock with no event (psi = 0)
    pub fn idle(&mut self, wall_delta: f64) -> Result<TickRecord, RuntimeError> {
        Ok(self.clock.tick(0.0, Some(wall_delta))?)
    }

    /// Entropy sweep at the current tau
    pub fn sweep(&mut self) -> SweepOutcome {
        let tau = self.clock.tau();
        self.engine.entropy_sweep(tau)
    }

    /// Statistics over the events processed so far; all zero before the first event
    pub fn summary(&self) -> Summary {
        let psi: Vec<f64> = self.events.iter().map(|e| e.components.psi).collect();
        let rates: Vec<f64> = self.events.iter().map(|e| e.tick.clock_rate).collect();
        let (psi_min, psi_max) = min_max(&psi);
        let (clock_rate_min, clock_rate_max) = min_max(&rates);
        Summary {
            events: self.events.len(),
            psi_min,
            psi_max,
            psi_mean: mean(&psi),
            clock_rate_min,
            clock_rate_max,
            clock_rate_mean: mean(&rates),
            tau_final: self.clock.tau(),
            wall_final: self.clock.wall_elapsed(),
            memories_written: self.memories_written,
            memories_alive: self.engine.len(),
        }
    }

    /// Process every event, sweep once at the final tau, and report
    pub fn run<I, S>(mut self, events: I) -> Result<RunReport, RuntimeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for text in events {
            self.step(text.as_ref())?;
        }
        let SweepOutcome {
            survivors,
            forgotten,
        } = self.sweep();
        let summary = self.summary();
        tracing::info!(
            events = summary.events,
            tau = summary.tau_final,
            written = summary.memories_written,
            alive = summary.memories_alive,
            "Simulation complete"
        );
        Ok(RunReport {
            events: self.events,
            survivors,
            forgotten,
            summary,
        })
    }
}
