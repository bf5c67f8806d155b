//! Novelty from injected (precomputed) embeddings
//!
//! Vectors come from an [`EmbeddingCache`]; this scorer never runs a model.
//! In deterministic mode a cache miss is a hard error, quantization must be
//! enabled, and the runtime must declare a CPU + fp32 execution profile (or
//! an explicit override) before any scoring is allowed.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};

use crate::cache::EmbeddingCache;
use crate::error::SalienceError;
use crate::scorer::{clamp_unit, Score, Scorer};

const METHOD: &str = "embedding_max_cosine_window";

/// Configuration for [`EmbeddingNovelty`]
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingNoveltyConfig {
    pub model_id: String,
    pub model_hash: String,
    pub window_size: usize,
    /// Quantization label, e.g. "int8"; "none" disables quantization
    pub quantization: String,
    pub deterministic_mode: bool,
    pub device: String,
    pub dtype: String,
    /// Runtime facts such as `execution_device`, `compute_dtype`,
    /// `deterministic_runtime_policy`
    pub runtime_metadata: BTreeMap<String, String>,
    pub allow_nondeterministic_runtime: bool,
    pub code_version: Option<String>,
}

impl Default for EmbeddingNoveltyConfig {
    fn default() -> Self {
        Self {
            model_id: String::new(),
            model_hash: String::new(),
            window_size: 5,
            quantization: "int8".to_string(),
            deterministic_mode: false,
            device: "cpu".to_string(),
            dtype: "float32".to_string(),
            runtime_metadata: BTreeMap::new(),
            allow_nondeterministic_runtime: false,
            code_version: None,
        }
    }
}

fn is_fp32(dtype: &str) -> bool {
    matches!(dtype, "float32" | "fp32")
}

impl EmbeddingNoveltyConfig {
    fn metadata(&self, key: &str) -> String {
        self.runtime_metadata
            .get(key)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default()
    }

    /// Check the deterministic-mode invariants; a no-op outside deterministic mode
    pub fn enforce_deterministic_invariants(&self) -> Result<(), SalienceError> {
        if !self.deterministic_mode {
            return Ok(());
        }

        if self.quantization.trim().eq_ignore_ascii_case("none") {
            return Err(SalienceError::Determinism {
                invariant: "quantization",
                detail: "deterministic mode requires quantization to be enabled \
                         (anything except 'none', e.g. 'int8')"
                    .to_string(),
            });
        }

        if self.allow_nondeterministic_runtime {
            return Ok(());
        }

        let explicit_policy = self.metadata("deterministic_runtime_policy") == "cpu_fp32";
        let declared_cpu_fp32 =
            self.metadata("execution_device") == "cpu" && is_fp32(&self.metadata("compute_dtype"));
        let runtime_cpu_fp32 = self.device.trim().eq_ignore_ascii_case("cpu")
            && is_fp32(&self.dtype.trim().to_lowercase());

        if !(explicit_policy || declared_cpu_fp32 || runtime_cpu_fp32) {
            return Err(SalienceError::Determinism {
                invariant: "runtime_metadata",
                detail: "deterministic mode requires CPU + fp32 runtime metadata \
                         (deterministic_runtime_policy=cpu_fp32, or execution_device=cpu \
                         with compute_dtype=float32) or allow_nondeterministic_runtime"
                    .to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CacheKeyPayload<'a> {
    text: &'a str,
    model_id: &'a str,
    model_hash: &'a str,
    novelty_method: &'a str,
    window_size: usize,
    quantization: &'a str,
}

/// Novelty = 1 - max cosine similarity against the last `window_size` vectors
#[derive(Debug)]
pub struct EmbeddingNovelty {
    config: EmbeddingNoveltyConfig,
    cache: Box<dyn EmbeddingCache>,
    history: VecDeque<Vec<f64>>,
}

impl EmbeddingNovelty {
    pub fn new(
        config: EmbeddingNoveltyConfig,
        cache: Box<dyn EmbeddingCache>,
    ) -> Result<Self, SalienceError> {
        if config.window_size == 0 {
            return Err(SalienceError::Config("window_size must be > 0".to_string()));
        }
        config.enforce_deterministic_invariants()?;
        Ok(Self {
            history: VecDeque::with_capacity(config.window_size + 1),
            config,
            cache,
        })
    }

    pub fn config(&self) -> &EmbeddingNoveltyConfig {
        &self.config
    }

    /// Cache key for `text` under this scorer's configuration
    pub fn cache_key(&self, text: &str) -> Result<String, SalienceError> {
        let payload = CacheKeyPayload {
            text,
            model_id: &self.config.model_id,
            model_hash: &self.config.model_hash,
            novelty_method: METHOD,
            window_size: self.config.window_size,
            quantization: &self.config.quantization,
        };
        let bytes =
            serde_jcs::to_vec(&payload).map_err(|e| SalienceError::Provenance(e.to_string()))?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    /// Store a precomputed embedding for `text`
    pub fn precompute(&mut self, text: &str, embedding: &[f64]) -> Result<(), SalienceError> {
        let key = self.cache_key(text)?;
        self.cache.set(&key, embedding)?;
        Ok(())
    }

    fn provenance(&self, score: Score) -> Score {
        let score = score
            .with_provenance("novelty_method", METHOD)
            .with_provenance("model_id", self.config.model_id.as_str())
            .with_provenance("model_hash", self.config.model_hash.as_str())
            .with_provenance("device", self.config.device.as_str())
            .with_provenance("dtype", self.config.dtype.as_str())
            .with_provenance("window_size", self.config.window_size.to_string())
            .with_provenance("quantization", self.config.quantization.as_str())
            .with_provenance("cache", "hit");
        let score = match &self.config.code_version {
            Some(version) => score.with_provenance("code_version", version.as_str()),
            None => score,
        };
        if self.config.deterministic_mode {
            score.with_provenance("deterministic", "true")
        } else {
            score
                .with_provenance("deterministic", "false")
                .with_provenance("reason", "operational_mode_cache_hit")
        }
    }
}

/// Cosine similarity; zero-norm vectors are treated as orthogonal
pub fn cosine_similarity(left: &[f64], right: &[f64]) -> Result<f64, SalienceError> {
    if left.len() != right.len() {
        return Err(SalienceError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    let (mut dot, mut left_norm, mut right_norm) = (0.0, 0.0, 0.0);
    for (l, r) in left.iter().zip(right) {
        dot += l * r;
        left_norm += l * l;
        right_norm += r * r;
    }
    if left_norm == 0.0 || right_norm == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (left_norm.sqrt() * right_norm.sqrt()))
}

impl Scorer for EmbeddingNovelty {
    fn method(&self) -> &'static str {
        METHOD
    }

    fn score(&mut self, text: &str) -> Result<Score, SalienceError> {
        let key = self.cache_key(text)?;
        let embedding = match self.cache.get(&key)? {
            Some(embedding) => embedding,
            None if self.config.deterministic_mode => {
                tracing::warn!(key = %key, backend = self.cache.name(), "Deterministic cache miss");
                return Err(SalienceError::Determinism {
                    invariant: "cache_hit_only",
                    detail: format!(
                        "missing precomputed embedding for key {}; precompute embeddings \
                         before deterministic replay",
                        key
                    ),
                });
            }
            None => return Err(SalienceError::CacheMiss(key)),
        };
        tracing::trace!(key = %key, backend = self.cache.name(), "Embedding cache hit");

        let mut max_similarity = 0.0_f64;
        for past in &self.history {
            max_similarity = max_similarity.max(cosine_similarity(&embedding, past)?);
        }

        self.history.push_back(embedding);
        while self.history.len() > self.config.window_size {
            self.history.pop_front();
        }

        let score = Score::new(clamp_unit(1.0 - max_similarity))
            .with_diagnostic("max_cosine_similarity", max_similarity)
            .with_diagnostic("history", self.history.len() as f64);
        Ok(self.provenance(score))
    }

    fn reset(&mut self) {
        tracing::debug!(scorer = METHOD, "Clearing embedding history");
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryEmbeddingCache;

    fn config(deterministic: bool) -> EmbeddingNoveltyConfig {
        EmbeddingNoveltyConfig {
            model_id: "mini-embed".to_string(),
            model_hash: "abc123".to_string(),
            window_size: 2,
            deterministic_mode: deterministic,
            ..Default::default()
        }
    }

    fn scorer(deterministic: bool) -> EmbeddingNovelty {
        let mut s =
            EmbeddingNovelty::new(config(deterministic), Box::new(InMemoryEmbeddingCache::new()))
                .unwrap();
        s.precompute("north", &[1.0, 0.0]).unwrap();
        s.precompute("east", &[0.0, 1.0]).unwrap();
        s.precompute("north-east", &[1.0, 1.0]).unwrap();
        s
    }

    #[test]
    fn test_cosine_novelty() {
        let mut s = scorer(true);
        assert_eq!(s.score("north").unwrap().value, 1.0);
        assert_eq!(s.score("east").unwrap().value, 1.0);
        let diag = s.score("north-east").unwrap();
        assert!((diag.value - (1.0 - 1.0 / 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic_cache_miss_fails_fast() {
        let mut s = scorer(true);
        match s.score("unknown") {
            Err(SalienceError::Determinism { invariant, .. }) => {
                assert_eq!(invariant, "cache_hit_only")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_operational_cache_miss() {
        let mut s = scorer(false);
        assert!(matches!(s.score("unknown"), Err(SalienceError::CacheMiss(_))));
        let hit = s.score("north").unwrap();
        assert_eq!(hit.provenance["reason"], "operational_mode_cache_hit");
    }

    #[test]
    fn test_quantization_required_in_deterministic_mode() {
        let cfg = EmbeddingNoveltyConfig {
            quantization: "none".to_string(),
            ..config(true)
        };
        let err = EmbeddingNovelty::new(cfg, Box::new(InMemoryEmbeddingCache::new())).unwrap_err();
        assert!(matches!(err, SalienceError::Determinism { invariant: "quantization", .. }));
    }

    #[test]
    fn test_runtime_profile_required() {
        let gpu = EmbeddingNoveltyConfig {
            device: "cuda".to_string(),
            dtype: "float16".to_string(),
            ..config(true)
        };
        assert!(matches!(
            gpu.enforce_deterministic_invariants(),
            Err(SalienceError::Determinism { invariant: "runtime_metadata", .. })
        ));

        let mut declared = gpu.clone();
        declared
            .runtime_metadata
            .insert("deterministic_runtime_policy".into(), "CPU_FP32".into());
        assert!(declared.enforce_deterministic_invariants().is_ok());

        let overridden = EmbeddingNoveltyConfig {
            allow_nondeterministic_runtime: true,
            ..gpu
        };
        assert!(overridden.enforce_deterministic_invariants().is_ok());
    }

    #[test]
    fn test_cache_key_depends_on_config() {
        let a = scorer(true);
        let b = EmbeddingNovelty::new(
            EmbeddingNoveltyConfig {
                window_size: 3,
                ..config(true)
            },
            Box::new(InMemoryEmbeddingCache::new()),
        )
        .unwrap();
        assert_ne!(a.cache_key("north").unwrap(), b.cache_key("north").unwrap());
        assert_eq!(a.cache_key("north").unwrap(), a.cache_key("north").unwrap());
    }

    #[test]
    fn test_dimension_mismatch() {
        assert!(matches!(
            cosine_similarity(&[1.0], &[1.0, 0.0]),
            Err(SalienceError::DimensionMismatch { left: 1, right: 2 })
        ));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_reset_replays_identically() {
        let mut s = scorer(true);
        let first: Vec<f64> = ["north", "east", "north"]
            .iter()
            .map(|t| s.score(t).unwrap().value)
            .collect();
        s.reset();
        let second: Vec<f64> = ["north", "east", "north"]
            .iter()
            .map(|t| s.score(t).unwrap().value)
            .collect();
        assert_eq!(first, second);
    }
}
