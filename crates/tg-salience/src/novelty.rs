//! Token-overlap novelty over a rolling window of prior events

use regex::Regex;
use std::collections::{BTreeSet, VecDeque};

use crate::error::SalienceError;
use crate::scorer::{clamp_unit, Score, Scorer};

const TOKEN_PATTERN: &str = r"[a-z0-9']+";

/// Configuration for [`TokenOverlapNovelty`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenOverlapConfig {
    /// Number of prior token sets kept for comparison
    pub window_size: usize,
}

impl Default for TokenOverlapConfig {
    fn default() -> Self {
        Self { window_size: 5 }
    }
}

/// Novelty = 1 - max Jaccard similarity against the last `window_size` events.
///
/// Text never leaves the scorer: provenance carries the window size and the
/// token count only.
#[derive(Debug, Clone)]
pub struct TokenOverlapNovelty {
    config: TokenOverlapConfig,
    token_pattern: Regex,
    history: VecDeque<BTreeSet<String>>,
}

impl TokenOverlapNovelty {
    pub fn new(config: TokenOverlapConfig) -> Result<Self, SalienceError> {
        if config.window_size == 0 {
            return Err(SalienceError::Config("window_size must be >= 1".to_string()));
        }
        let token_pattern =
            Regex::new(TOKEN_PATTERN).map_err(|e| SalienceError::Config(e.to_string()))?;
        Ok(Self {
            history: VecDeque::with_capacity(config.window_size + 1),
            config,
            token_pattern,
        })
    }

    /// Convenience constructor for a given window size
    pub fn with_window(window_size: usize) -> Result<Self, SalienceError> {
        Self::new(TokenOverlapConfig { window_size })
    }

    pub fn config(&self) -> &TokenOverlapConfig {
        &self.config
    }

    /// Number of token sets currently held
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn tokenize(&self, text: &str) -> BTreeSet<String> {
        let lowered = text.to_lowercase();
        self.token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    let union = left.union(right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(right).count() as f64 / union as f64
}

impl Scorer for TokenOverlapNovelty {
    fn method(&self) -> &'static str {
        "token_jaccard_window"
    }

    fn score(&mut self, text: &str) -> Result<Score, SalienceError> {
        let tokens = self.tokenize(text);

        // Empty input or empty history: similarity is defined as zero.
        let max_similarity = if tokens.is_empty() {
            0.0
        } else {
            self.history
                .iter()
                .map(|past| jaccard(&tokens, past))
                .fold(0.0_f64, f64::max)
        };

        let token_count = tokens.len();
        self.history.push_back(tokens);
        while self.history.len() > self.config.window_size {
            self.history.pop_front();
        }

        Ok(Score::new(clamp_unit(1.0 - max_similarity))
            .with_diagnostic("jaccard_max", max_similarity)
            .with_diagnostic("tokens", token_count as f64)
            .with_diagnostic("history", self.history.len() as f64)
            .with_provenance("novelty_method", self.method())
            .with_provenance("window_size", self.config.window_size.to_string())
            .with_provenance("token_count", token_count.to_string()))
    }

    fn reset(&mut self) {
        tracing::debug!(scorer = self.method(), "Clearing novelty history");
        self.history.clear();
    }
}
