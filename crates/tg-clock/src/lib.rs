//! # TG Clock
//!
//! Reparameterizes wall time into an internal time accumulator (tau) whose
//! rate slows as salience load (psi) rises.
//!
//! ```rust
//! use tg_clock::{ClockConfig, ClockRateModulator};
//!
//! let mut clock = ClockRateModulator::new(ClockConfig::default()).unwrap();
//! clock.tick(0.0, Some(1.0)).unwrap(); // calm: tau advances ~1:1
//! clock.tick(1.0, Some(1.0)).unwrap(); // loaded: tau advances at half rate
//! assert_eq!(clock.tau(), 1.5);
//! ```

pub mod density;
pub mod error;
pub mod modulator;
pub mod time_source;

pub use density::{information_density, psi_from_density};
pub use error::ClockError;
pub use modulator::{ClockConfig, ClockRateModulator, SalienceMode, TickRecord};
pub use time_source::{ManualClock, SystemClock, TimeSource};
