//! Telemetry validation errors

use thiserror::Error;

/// Closed-schema violations; nothing is coerced
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Packet must be a JSON object")]
    NotAnObject,

    #[error("Missing required keys: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("Unknown telemetry keys: {0:?}")]
    UnknownKeys(Vec<String>),

    #[error("Legacy keys present in canonical packet: {0:?}")]
    LegacyKeys(Vec<String>),

    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0} must be finite")]
    NonFinite(&'static str),

    #[error("SALIENCE must be within [0.0, 1.0], got {0}")]
    SalienceOutOfRange(f64),

    #[error("DEPTH must be non-negative, got {0}")]
    NegativeDepth(i64),

    #[error("CLOCK_RATE {value} must be within [{lower}, {upper}]")]
    ClockRateOutOfBounds { value: f64, lower: f64, upper: f64 },

    #[error("PROVENANCE_HASH is required")]
    MissingProvenanceHash,

    #[error("PROVENANCE_HASH must be a non-empty string")]
    BlankProvenanceHash,

    #[error("SCHEMA_VERSION must be canonical \"1.0\" (legacy \"1\" accepted on read), got {0:?}")]
    UnsupportedSchemaVersion(String),

    /// A legacy packet lacks every alias for a required field
    #[error("Legacy packet missing {0}")]
    MissingLegacyField(&'static str),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
