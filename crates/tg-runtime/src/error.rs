//! Runtime error type

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the simulation loop and replay checks
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Salience error: {0}")]
    Salience(#[from] tg_salience::SalienceError),

    #[error("Clock error: {0}")]
    Clock(#[from] tg_clock::ClockError),

    #[error("Memory error: {0}")]
    Memory(#[from] tg_memory::MemoryError),

    #[error("Telemetry error: {0}")]
    Schema(#[from] tg_telemetry::SchemaError),

    /// Two runs that should be identical diverged
    #[error("Replay mismatch: {0}")]
    ReplayMismatch(String),

    /// A diagnostics policy is malformed
    #[error("Invalid replay policy: {0}")]
    InvalidPolicy(String),

    /// Calibration over an empty event list
    #[error("Run produced no events")]
    EmptyRun,
}
