//! # TG Runtime
//!
//! Wires the salience pipeline, clock-rate modulator, decay engine and
//! telemetry schema into one deterministic simulation loop.
//!
//! ## Quick Start
//!
//! ```rust
//! use tg_runtime::{Simulation, TemporalGradientConfig};
//!
//! let report = Simulation::new(TemporalGradientConfig::default())
//!     .unwrap()
//!     .run(["stop the coolant pump", "routine inspection logged"])
//!     .unwrap();
//!
//! assert_eq!(report.summary.events, 2);
//! assert!(report.summary.tau_final <= report.summary.wall_final);
//! ```

pub mod calibration;
pub mod config;
pub mod error;
pub mod logging;
pub mod replay;
pub mod simulation;

pub use calibration::{run_calibration, run_default_calibration, CalibrationReport, CALIBRATION_EVENTS};
pub use crate::config::{
    ClockSettings, ConfigError, MemorySettings, PolicySettings, SalienceSettings,
    TemporalGradientConfig,
};
pub use error::RuntimeError;
pub use logging::init_tracing;
pub use replay::{assert_strict_invariants, DiagnosticsPolicy, ReplayExpectation};
pub use simulation::{memory_id, EventRecord, RunReport, Simulation, Summary};
