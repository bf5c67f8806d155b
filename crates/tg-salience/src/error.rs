//! Error types for salience scoring

use thiserror::Error;

/// Errors raised by embedding cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    /// Stored payload could not be read back as a vector
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error from a directory-backed cache
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while scoring salience
#[derive(Debug, Error)]
pub enum SalienceError {
    /// Scorer configuration is malformed or out of range
    #[error("Invalid scorer configuration: {0}")]
    Config(String),

    /// A determinism invariant was violated; no nondeterministic fallback is attempted
    #[error("Deterministic invariant failed [{invariant}]: {detail}")]
    Determinism {
        invariant: &'static str,
        detail: String,
    },

    /// Operational-mode cache miss (embeddings are never computed live)
    #[error("Embedding cache miss for key {0}; live embedding compute is not available")]
    CacheMiss(String),

    /// Cached vectors of different lengths were compared
    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Provenance preimage could not be canonicalized
    #[error("Provenance encoding failed: {0}")]
    Provenance(String),

    /// Cache backend failure
    #[error(transparent)]
    Cache(#[from] CacheError),
}
