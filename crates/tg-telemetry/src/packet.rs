//! Canonical telemetry packets and the chronometric vector that builds them

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::{SchemaOptions, SCHEMA_VERSION};

/// Decimal places used when emitting each field
pub mod precision {
    pub const WALL_T: i32 = 2;
    pub const TAU: i32 = 2;
    pub const SALIENCE: i32 = 3;
    pub const CLOCK_RATE: i32 = 4;
    pub const MEMORY_S: i32 = 4;
    pub const COMPONENT: i32 = 4;
}

/// Round to `places` decimals, ties to even.
///
/// Ties are judged on the scaled binary value, so `0.125` (exact in binary)
/// rounds to `0.12` while `2.675` (stored just below) rounds to `2.67`.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

/// One canonical telemetry packet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPacket {
    #[serde(rename = "SCHEMA_VERSION")]
    pub schema_version: String,
    #[serde(rename = "WALL_T")]
    pub wall_t: f64,
    #[serde(rename = "TAU")]
    pub tau: f64,
    #[serde(rename = "SALIENCE")]
    pub salience: f64,
    #[serde(rename = "CLOCK_RATE")]
    pub clock_rate: f64,
    #[serde(rename = "MEMORY_S")]
    pub memory_s: f64,
    #[serde(rename = "DEPTH")]
    pub depth: u64,
    #[serde(rename = "H", default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(rename = "V", default, skip_serializing_if = "Option::is_none")]
    pub v: Option<f64>,
    #[serde(rename = "PROVENANCE_HASH", default, skip_serializing_if = "Option::is_none")]
    pub provenance_hash: Option<String>,
}

impl TelemetryPacket {
    /// Range and presence checks on an already typed packet
    pub fn validate(&self, options: &SchemaOptions) -> Result<(), SchemaError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedSchemaVersion(
                self.schema_version.clone(),
            ));
        }
        for (field, value) in [
            ("WALL_T", self.wall_t),
            ("TAU", self.tau),
            ("SALIENCE", self.salience),
            ("CLOCK_RATE", self.clock_rate),
            ("MEMORY_S", self.memory_s),
        ] {
            if !value.is_finite() {
                return Err(SchemaError::NonFinite(field));
            }
        }
        for (field, value) in [("H", self.h), ("V", self.v)] {
            if matches!(value, Some(v) if !v.is_finite()) {
                return Err(SchemaError::NonFinite(field));
            }
        }
        if !(0.0..=1.0).contains(&self.salience) {
            return Err(SchemaError::SalienceOutOfRange(self.salience));
        }
        match &self.provenance_hash {
            Some(hash) if hash.trim().is_empty() => return Err(SchemaError::BlankProvenanceHash),
            None if options.require_provenance_hash => {
                return Err(SchemaError::MissingProvenanceHash)
            }
            _ => {}
        }
        if let Some((lower, upper)) = options.clock_rate_bounds {
            if self.clock_rate < lower || self.clock_rate > upper {
                return Err(SchemaError::ClockRateOutOfBounds {
                    value: self.clock_rate,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, SchemaError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Unrounded telemetry state for one event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChronometricVector {
    pub wall_clock_time: f64,
    pub tau: f64,
    pub psi: f64,
    pub recursion_depth: u64,
    pub clock_rate: Option<f64>,
    pub memory_strength: Option<f64>,
    pub h: Option<f64>,
    pub v: Option<f64>,
    pub provenance_hash: Option<String>,
}

impl ChronometricVector {
    pub fn new(wall_clock_time: f64, tau: f64, psi: f64) -> Self {
        Self {
            wall_clock_time,
            tau,
            psi,
            ..Default::default()
        }
    }

    pub fn with_clock_rate(mut self, clock_rate: f64) -> Self {
        self.clock_rate = Some(clock_rate);
        self
    }

    pub fn with_memory_strength(mut self, memory_strength: f64) -> Self {
        self.memory_strength = Some(memory_strength);
        self
    }

    pub fn with_components(mut self, h: f64, v: f64) -> Self {
        self.h = Some(h);
        self.v = Some(v);
        self
    }

    pub fn with_provenance_hash(mut self, hash: impl Into<String>) -> Self {
        self.provenance_hash = Some(hash.into());
        self
    }

    pub fn with_depth(mut self, depth: u64) -> Self {
        self.recursion_depth = depth;
        self
    }

    /// Round every field to its emission precision and build the packet.
    ///
    /// Clock rate and memory strength are required by the canonical schema.
    pub fn to_packet(&self) -> Result<TelemetryPacket, SchemaError> {
        let mut missing = Vec::new();
        if self.clock_rate.is_none() {
            missing.push("CLOCK_RATE".to_string());
        }
        if self.memory_strength.is_none() {
            missing.push("MEMORY_S".to_string());
        }
        let (Some(clock_rate), Some(memory_strength)) = (self.clock_rate, self.memory_strength)
        else {
            return Err(SchemaError::MissingKeys(missing));
        };

        Ok(TelemetryPacket {
            schema_version: SCHEMA_VERSION.to_string(),
            wall_t: round_to(self.wall_clock_time, precision::WALL_T),
            tau: round_to(self.tau, precision::TAU),
            salience: round_to(self.psi, precision::SALIENCE),
            clock_rate: round_to(clock_rate, precision::CLOCK_RATE),
            memory_s: round_to(memory_strength, precision::MEMORY_S),
            depth: self.recursion_depth,
            h: self.h.map(|h| round_to(h, precision::COMPONENT)),
            v: self.v.map(|v| round_to(v, precision::COMPONENT)),
            provenance_hash: self.provenance_hash.clone(),
        })
    }

    /// Build, validate, and serialize in one step
    pub fn to_packet_json(&self, options: &SchemaOptions) -> Result<String, SchemaError> {
        let packet = self.to_packet()?;
        packet.validate(options)?;
        packet.to_json()
    }
}

impl From<&TelemetryPacket> for ChronometricVector {
    fn from(packet: &TelemetryPacket) -> Self {
        Self {
            wall_clock_time: packet.wall_t,
            tau: packet.tau,
            psi: packet.salience,
            recursion_depth: packet.depth,
            clock_rate: Some(packet.clock_rate),
            memory_strength: Some(packet.memory_s),
            h: packet.h,
            v: packet.v,
            provenance_hash: packet.provenance_hash.clone(),
        }
    }
}
