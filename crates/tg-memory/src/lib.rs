//! # TG Memory
//!
//! Entropic memories whose strength decays exponentially in internal time.
//!
//! Stored strength is a baseline: it changes on creation and on access, and
//! decay is projected from `last_accessed_tau` whenever strength is read or a
//! sweep runs. Sweeps evict anything whose projected strength is at or below
//! the prune threshold.
//!
//! ## Quick Start
//!
//! ```rust
//! use tg_memory::{initial_strength_from_psi, DecayEngine, EntropicMemory, INITIAL_STRENGTH_MAX};
//!
//! let mut engine = DecayEngine::with_half_life(10.0, 0.2).unwrap();
//! let strength = initial_strength_from_psi(1.0, INITIAL_STRENGTH_MAX);
//! engine.add_memory(EntropicMemory::with_id("m1", "reactor alarm", strength), 0.0).unwrap();
//!
//! let outcome = engine.entropy_sweep(10.0);
//! assert_eq!(outcome.survivors[0].1, 0.6);
//! ```

pub mod decay;
pub mod engine;
pub mod error;
pub mod policy;
pub mod record;
pub mod store;

pub use decay::{
    decay_strength, initial_strength_from_psi, should_encode, DecayLaw, INITIAL_STRENGTH_MAX,
    S_MAX,
};
pub use engine::DecayEngine;
pub use error::MemoryError;
pub use policy::CooldownPolicy;
pub use record::{EntropicMemory, MIN_BOOST};
pub use store::{CollisionPolicy, DecayMemoryStore, MemoryStore, SweepOutcome};
