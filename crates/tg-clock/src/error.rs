//! Error types for the clock-rate modulator

use thiserror::Error;

/// Errors raised by clock configuration and ticks
#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    /// Malformed or out-of-range clock configuration
    #[error("Invalid clock configuration: {0}")]
    InvalidConfig(String),

    /// Canonical mode requires an explicit psi
    #[error("psi is required in canonical mode")]
    MissingPsi,

    /// Legacy-density mode needs either psi or input text
    #[error("legacy_density mode requires psi or input_context to derive psi")]
    MissingInputContext,

    #[error("psi must be finite, got {0}")]
    NonFinitePsi(f64),

    /// Strict canonical mode rejects psi above 1
    #[error("psi must be within [0, 1] in canonical mode, got {0}")]
    PsiOutOfBounds(f64),

    #[error("wall_delta must be finite and non-negative, got {0}")]
    NegativeWallDelta(f64),

    /// No explicit `wall_delta` and no time source to derive one from
    #[error("wall_delta is required when no time source is attached")]
    MissingWallDelta,
}
