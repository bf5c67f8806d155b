//! # TG Salience
//!
//! Turns raw event text into a bounded salience load `psi = H x V`.
//!
//! - [`TokenOverlapNovelty`] - rolling-window Jaccard novelty
//! - [`EmbeddingNovelty`] - rolling-window cosine novelty over injected vectors
//! - [`KeywordValue`] - whole-word keyword importance
//! - [`JudgeNovelty`] / [`JudgeValue`] - adapters over an external [`Judge`]
//! - [`SaliencePipeline`] - composes one novelty and one value scorer
//! - [`compute_provenance_hash`] - replay fingerprint over scorer provenance
//!
//! ## Quick Start
//!
//! ```rust
//! use tg_salience::{KeywordValue, KeywordValueConfig, SaliencePipeline, TokenOverlapNovelty};
//!
//! let mut pipeline = SaliencePipeline::new(
//!     Box::new(TokenOverlapNovelty::with_window(3).unwrap()),
//!     Box::new(KeywordValue::new(KeywordValueConfig::default()).unwrap()),
//! );
//!
//! let first = pipeline.evaluate("critical: coolant pressure dropping").unwrap();
//! let repeat = pipeline.evaluate("critical: coolant pressure dropping").unwrap();
//! assert!(first.psi > repeat.psi);
//!
//! // Replay from a clean history reproduces the same scores
//! pipeline.reset();
//! let replay = pipeline.evaluate("critical: coolant pressure dropping").unwrap();
//! assert_eq!(first.provenance_hash().unwrap(), replay.provenance_hash().unwrap());
//! ```

pub mod cache;
pub mod embedding;
pub mod error;
pub mod judge;
pub mod novelty;
pub mod pipeline;
pub mod provenance;
pub mod scorer;
pub mod value;

pub use cache::{EmbeddingCache, InMemoryEmbeddingCache, JsonDirectoryEmbeddingCache};
pub use embedding::{cosine_similarity, EmbeddingNovelty, EmbeddingNoveltyConfig};
pub use error::{CacheError, SalienceError};
pub use judge::{share, Judge, JudgeNovelty, JudgeValue, SharedJudge};
pub use novelty::{TokenOverlapConfig, TokenOverlapNovelty};
pub use pipeline::{SalienceComponents, SaliencePipeline};
pub use provenance::{compute_provenance_hash, HashParams, PROVENANCE_KIND, PROVENANCE_VERSION};
pub use scorer::{clamp_unit, Diagnostics, Provenance, Score, Scorer};
pub use value::{KeywordValue, KeywordValueConfig, DEFAULT_KEYWORDS};
