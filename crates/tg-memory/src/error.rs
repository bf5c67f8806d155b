//! Error types for the memory store

use thiserror::Error;

/// Store invariant violations and decay configuration errors
#[derive(Debug, Error, PartialEq)]
pub enum MemoryError {
    /// Insert under reject-mode hit an existing id
    #[error("Record with id {0:?} already exists")]
    DuplicateId(String),

    #[error("Strength {strength} for {id:?} must be within [0.0, {s_max}]")]
    StrengthOutOfRange { id: String, strength: f64, s_max: f64 },

    /// last_accessed_tau would move backwards for an existing id
    #[error("last_accessed_tau cannot regress for {id:?}: {previous} -> {attempted}")]
    TauRegression {
        id: String,
        previous: f64,
        attempted: f64,
    },

    #[error("Invalid decay configuration: {0}")]
    InvalidConfig(String),
}
