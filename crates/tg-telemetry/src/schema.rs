//! Closed telemetry schema
//!
//! Canonical packets carry exactly the required keys plus any of the optional
//! ones. Types are checked strictly: DEPTH must be a JSON integer, the numeric
//! fields must be JSON numbers, and strings are never parsed as numbers.

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::packet::TelemetryPacket;

pub const SCHEMA_VERSION: &str = "1.0";

/// Accepted on read and normalized to [`SCHEMA_VERSION`]
pub const LEGACY_SCHEMA_VERSION: &str = "1";

pub const REQUIRED_KEYS: [&str; 7] = [
    "SCHEMA_VERSION",
    "WALL_T",
    "TAU",
    "SALIENCE",
    "CLOCK_RATE",
    "MEMORY_S",
    "DEPTH",
];

pub const OPTIONAL_KEYS: [&str; 3] = ["H", "V", "PROVENANCE_HASH"];

const NUMERIC_FIELDS: [&str; 5] = ["WALL_T", "TAU", "SALIENCE", "CLOCK_RATE", "MEMORY_S"];

/// Extra checks beyond the closed schema
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SchemaOptions {
    pub require_provenance_hash: bool,
    /// Inclusive `(lower, upper)` bounds on CLOCK_RATE
    pub clock_rate_bounds: Option<(f64, f64)>,
}

impl SchemaOptions {
    pub fn require_provenance_hash(mut self) -> Self {
        self.require_provenance_hash = true;
        self
    }

    pub fn with_clock_rate_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.clock_rate_bounds = Some((lower, upper));
        self
    }
}

/// Map a canonical or legacy schema version to the canonical string
pub fn normalize_schema_version(version: &str) -> Result<&'static str, SchemaError> {
    match version {
        SCHEMA_VERSION => Ok(SCHEMA_VERSION),
        LEGACY_SCHEMA_VERSION => {
            tracing::debug!(version, "Normalizing legacy schema version");
            Ok(SCHEMA_VERSION)
        }
        other => Err(SchemaError::UnsupportedSchemaVersion(other.to_string())),
    }
}

fn finite_number(map: &Map<String, Value>, field: &'static str) -> Result<f64, SchemaError> {
    let value = map
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(SchemaError::WrongType {
            field,
            expected: "a number",
        })?;
    if !value.is_finite() {
        return Err(SchemaError::NonFinite(field));
    }
    Ok(value)
}

fn optional_number(map: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, SchemaError> {
    if map.contains_key(field) {
        finite_number(map, field).map(Some)
    } else {
        Ok(None)
    }
}

fn depth(map: &Map<String, Value>) -> Result<u64, SchemaError> {
    let wrong_type = SchemaError::WrongType {
        field: "DEPTH",
        expected: "an integer",
    };
    match map.get("DEPTH") {
        Some(Value::Number(n)) => {
            if let Some(d) = n.as_u64() {
                Ok(d)
            } else if let Some(d) = n.as_i64() {
                Err(SchemaError::NegativeDepth(d))
            } else {
                Err(wrong_type)
            }
        }
        _ => Err(wrong_type),
    }
}

/// Validate an untyped packet against the closed schema.
///
/// Returns the typed packet with its schema version normalized.
pub fn validate_packet(packet: &Value, options: &SchemaOptions) -> Result<TelemetryPacket, SchemaError> {
    let map = packet.as_object().ok_or(SchemaError::NotAnObject)?;

    let mut missing: Vec<String> = REQUIRED_KEYS
        .iter()
        .filter(|k| !map.contains_key(**k))
        .map(|k| k.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(SchemaError::MissingKeys(missing));
    }

    let mut unknown: Vec<String> = map
        .keys()
        .filter(|k| !REQUIRED_KEYS.contains(&k.as_str()) && !OPTIONAL_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(SchemaError::UnknownKeys(unknown));
    }

    let schema_version = map
        .get("SCHEMA_VERSION")
        .and_then(Value::as_str)
        .ok_or(SchemaError::WrongType {
            field: "SCHEMA_VERSION",
            expected: "a string",
        })?;
    let schema_version = normalize_schema_version(schema_version)?;

    let provenance_hash = match map.get("PROVENANCE_HASH") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(SchemaError::WrongType {
                field: "PROVENANCE_HASH",
                expected: "a string",
            })
        }
    };

    let mut numbers = [0.0; NUMERIC_FIELDS.len()];
    for (slot, field) in numbers.iter_mut().zip(NUMERIC_FIELDS) {
        *slot = finite_number(map, field)?;
    }
    let [wall_t, tau, salience, clock_rate, memory_s] = numbers;

    let typed = TelemetryPacket {
        schema_version: schema_version.to_string(),
        wall_t,
        tau,
        salience,
        clock_rate,
        memory_s,
        depth: depth(map)?,
        h: optional_number(map, "H")?,
        v: optional_number(map, "V")?,
        provenance_hash,
    };
    typed.validate(options)?;
    Ok(typed)
}

/// Parse and validate a packet from JSON text
pub fn validate_packet_str(json: &str, options: &SchemaOptions) -> Result<TelemetryPacket, SchemaError> {
    let value: Value = serde_json::from_str(json)?;
    validate_packet(&value, options)
}
