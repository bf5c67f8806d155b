//! Packet decoding for canonical and legacy-density producers

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::packet::ChronometricVector;
use crate::schema::{validate_packet, SchemaOptions};

/// Keys only older producers emit
pub const LEGACY_KEYS: [&str; 6] = ["t_obj", "r", "legacy_density", "LEGACY_DENSITY", "clock_rate", "psi"];

/// How to interpret an incoming packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketMode {
    /// Closed schema; legacy keys are an error
    #[default]
    Canonical,
    /// Alias mapping for packets written before the canonical schema
    LegacyDensity,
}

fn first_number(
    map: &Map<String, Value>,
    aliases: &[&str],
    field: &'static str,
) -> Result<Option<f64>, SchemaError> {
    match aliases.iter().find_map(|k| map.get(*k)) {
        None => Ok(None),
        Some(value) => {
            let n = value.as_f64().ok_or(SchemaError::WrongType {
                field,
                expected: "a number",
            })?;
            if n.is_finite() {
                Ok(Some(n))
            } else {
                Err(SchemaError::NonFinite(field))
            }
        }
    }
}

fn decode_legacy(map: &Map<String, Value>) -> Result<ChronometricVector, SchemaError> {
    let wall_clock_time = first_number(map, &["WALL_T", "t_obj"], "WALL_T")?
        .ok_or(SchemaError::MissingLegacyField("WALL_T"))?;
    let tau = first_number(map, &["TAU", "tau"], "TAU")?
        .ok_or(SchemaError::MissingLegacyField("TAU"))?;
    let psi = first_number(
        map,
        &["SALIENCE", "psi", "legacy_density", "LEGACY_DENSITY"],
        "SALIENCE",
    )?
    .ok_or(SchemaError::MissingLegacyField("SALIENCE"))?;

    let recursion_depth = match ["DEPTH", "r"].iter().find_map(|k| map.get(*k)) {
        None => 0,
        Some(value) => value.as_u64().ok_or(SchemaError::WrongType {
            field: "DEPTH",
            expected: "a non-negative integer",
        })?,
    };

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

    Ok(ChronometricVector {
        wall_clock_time,
        tau,
        psi,
        recursion_depth,
        clock_rate: first_number(map, &["CLOCK_RATE", "clock_rate"], "CLOCK_RATE")?,
        memory_strength: first_number(map, &["MEMORY_S", "S"], "MEMORY_S")?,
        h: first_number(map, &["H"], "H")?,
        v: first_number(map, &["V"], "V")?,
        provenance_hash,
    })
}

impl ChronometricVector {
    /// Decode a packet from JSON text.
    ///
    /// Canonical mode rejects legacy keys and then applies the closed schema.
    /// Legacy mode maps old aliases onto canonical fields and validates only
    /// types; its output is not guaranteed to pass canonical validation.
    pub fn from_packet(json: &str, mode: PacketMode, options: &SchemaOptions) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, mode, options)
    }

    pub fn from_value(value: &Value, mode: PacketMode, options: &SchemaOptions) -> Result<Self, SchemaError> {
        let map = value.as_object().ok_or(SchemaError::NotAnObject)?;
        match mode {
            PacketMode::Canonical => {
                let mut legacy: Vec<String> = LEGACY_KEYS
                    .iter()
                    .filter(|k| map.contains_key(**k))
                    .map(|k| k.to_string())
                    .collect();
                if !legacy.is_empty() {
                    legacy.sort();
                    return Err(SchemaError::LegacyKeys(legacy));
                }
                let packet = validate_packet(value, options)?;
                Ok(ChronometricVector::from(&packet))
            }
            PacketMode::LegacyDensity => decode_legacy(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_decode() {
        let json = ChronometricVector::new(2.0, 1.5, 0.25)
            .with_clock_rate(0.8)
            .with_memory_strength(0.3)
            .with_depth(2)
            .to_packet_json(&SchemaOptions::default())
            .unwrap();
        let decoded =
            ChronometricVector::from_packet(&json, PacketMode::Canonical, &SchemaOptions::default())
                .unwrap();
        assert_eq!(decoded.tau, 1.5);
        assert_eq!(decoded.recursion_depth, 2);
        assert_eq!(decoded.clock_rate, Some(0.8));
    }

    #[test]
    fn test_canonical_rejects_legacy_keys() {
        let packet = json!({
            "SCHEMA_VERSION": "1.0", "WALL_T": 1.0, "TAU": 1.0, "SALIENCE": 0.1,
            "CLOCK_RATE": 0.9, "MEMORY_S": 0.0, "DEPTH": 0, "psi": 0.1,
        });
        match ChronometricVector::from_value(&packet, PacketMode::Canonical, &SchemaOptions::default()) {
            Err(SchemaError::LegacyKeys(keys)) => assert_eq!(keys, vec!["psi"]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_legacy_alias_mapping() {
        let packet = json!({"t_obj": 4.0, "tau": 3.2, "legacy_density": 0.7, "r": 3, "clock_rate": 0.6, "S": 0.9});
        let decoded =
            ChronometricVector::from_value(&packet, PacketMode::LegacyDensity, &SchemaOptions::default())
                .unwrap();
        assert_eq!(decoded.wall_clock_time, 4.0);
        assert_eq!(decoded.tau, 3.2);
        assert_eq!(decoded.psi, 0.7);
        assert_eq!(decoded.recursion_depth, 3);
        assert_eq!(decoded.clock_rate, Some(0.6));
        assert_eq!(decoded.memory_strength, Some(0.9));
    }

    #[test]
    fn test_legacy_prefers_canonical_keys_and_defaults_depth() {
        let packet = json!({"WALL_T": 1.0, "t_obj": 9.0, "TAU": 0.5, "SALIENCE": 0.2, "psi": 0.9});
        let decoded =
            ChronometricVector::from_value(&packet, PacketMode::LegacyDensity, &SchemaOptions::default())
                .unwrap();
        assert_eq!(decoded.wall_clock_time, 1.0);
        assert_eq!(decoded.psi, 0.2);
        assert_eq!(decoded.recursion_depth, 0);
        assert_eq!(decoded.clock_rate, None);
    }

    #[test]
    fn test_legacy_missing_fields() {
        let packet = json!({"t_obj": 4.0, "tau": 3.2});
        assert!(matches!(
            ChronometricVector::from_value(&packet, PacketMode::LegacyDensity, &SchemaOptions::default()),
            Err(SchemaError::MissingLegacyField("SALIENCE"))
        ));
    }
}
