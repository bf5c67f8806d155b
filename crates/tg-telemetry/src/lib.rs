//! # TG Telemetry
//!
//! Canonical chronometric packets with a closed, strictly typed schema.
//!
//! | Key | Type | Precision |
//! |-----|------|-----------|
//! | SCHEMA_VERSION | `"1.0"` (legacy `"1"` accepted on read) | |
//! | WALL_T, TAU | finite number | 2 dp |
//! | SALIENCE | finite number in [0, 1] | 3 dp |
//! | CLOCK_RATE, MEMORY_S | finite number | 4 dp |
//! | DEPTH | non-negative integer | |
//! | H, V | optional finite number | 4 dp |
//! | PROVENANCE_HASH | optional non-empty string | |
//!
//! ```rust
//! use tg_telemetry::{validate_packet_str, ChronometricVector, SchemaOptions};
//!
//! let json = ChronometricVector::new(1.0, 0.77, 0.3)
//!     .with_clock_rate(0.769231)
//!     .with_memory_strength(0.36)
//!     .to_packet_json(&SchemaOptions::default())
//!     .unwrap();
//! let packet = validate_packet_str(&json, &SchemaOptions::default()).unwrap();
//! assert_eq!(packet.clock_rate, 0.7692);
//! ```

pub mod decode;
pub mod error;
pub mod packet;
pub mod schema;

pub use decode::{PacketMode, LEGACY_KEYS};
pub use error::SchemaError;
pub use packet::{round_to, ChronometricVector, TelemetryPacket};
pub use schema::{
    normalize_schema_version, validate_packet, validate_packet_str, SchemaOptions,
    LEGACY_SCHEMA_VERSION, OPTIONAL_KEYS, REQUIRED_KEYS, SCHEMA_VERSION,
};
