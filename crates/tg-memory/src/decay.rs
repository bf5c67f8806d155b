//! Closed-form exponential decay in internal time
//!
//! `strength(tau) = strength0 x exp(-lambda x elapsed_tau)`, parameterized
//! either directly by lambda or by a half-life (`lambda = ln 2 / half_life`).
//! The half-life form is evaluated as `0.5^(elapsed / half_life)` so that
//! whole half-lives land on exact binary fractions.

use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// Default hard ceiling on stored strength
pub const S_MAX: f64 = 1.5;

/// Default cap on the strength of a freshly encoded memory
pub const INITIAL_STRENGTH_MAX: f64 = 1.2;

/// Decay speed parameterization
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayLaw {
    HalfLife(f64),
    Lambda(f64),
}

impl DecayLaw {
    /// Check half_life > 0 or lambda >= 0
    pub fn validate(&self) -> Result<(), MemoryError> {
        match *self {
            Self::HalfLife(h) if !(h.is_finite() && h > 0.0) => Err(MemoryError::InvalidConfig(
                format!("half_life must be > 0.0, got {}", h),
            )),
            Self::Lambda(l) if !(l.is_finite() && l >= 0.0) => Err(MemoryError::InvalidConfig(
                format!("decay_lambda must be >= 0.0, got {}", l),
            )),
            _ => Ok(()),
        }
    }

    /// Equivalent decay rate
    pub fn lambda(&self) -> f64 {
        match *self {
            Self::HalfLife(h) => std::f64::consts::LN_2 / h,
            Self::Lambda(l) => l,
        }
    }

    /// Retention factor after `elapsed_tau`; negative elapsed counts as zero
    pub fn retention(&self, elapsed_tau: f64) -> f64 {
        let elapsed = elapsed_tau.max(0.0);
        match *self {
            Self::HalfLife(h) => 0.5_f64.powf(elapsed / h),
            Self::Lambda(l) => (-l * elapsed).exp(),
        }
    }
}

impl Default for DecayLaw {
    fn default() -> Self {
        Self::HalfLife(50.0)
    }
}

/// Project `strength` forward by `elapsed_tau`; rounding noise floors to 0.0
pub fn decay_strength(strength: f64, elapsed_tau: f64, law: DecayLaw) -> f64 {
    let decayed = strength * law.retention(elapsed_tau);
    if decayed > 0.0 {
        decayed
    } else {
        0.0
    }
}

/// Encode when psi reaches the threshold
pub fn should_encode(psi: f64, threshold: f64) -> bool {
    psi >= threshold
}

/// Initial strength for a new memory: clamp(psi, 0, 1) x cap
pub fn initial_strength_from_psi(psi: f64, cap: f64) -> f64 {
    let normalized = if psi.is_nan() { 0.0 } else { psi.clamp(0.0, 1.0) };
    normalized * cap
}
