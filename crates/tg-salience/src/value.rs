//! Keyword-driven value (importance) scoring

use regex::Regex;

use crate::error::SalienceError;
use crate::scorer::{Score, Scorer};

/// Keywords used when none are configured
pub const DEFAULT_KEYWORDS: [&str; 7] = [
    "must", "never", "critical", "always", "don't", "stop", "urgent",
];

/// Configuration for [`KeywordValue`]
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordValueConfig {
    /// Whole words matched case-insensitively; must not be empty
    pub keywords: Vec<String>,
    /// Value with no keyword hits
    pub base_value: f64,
    /// Added per keyword hit
    pub hit_value: f64,
    /// Upper clamp on the value
    pub max_value: f64,
}

impl Default for KeywordValueConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            base_value: 0.1,
            hit_value: 0.2,
            max_value: 1.0,
        }
    }
}

impl KeywordValueConfig {
    fn validate(&self) -> Result<(), SalienceError> {
        if self.keywords.is_empty() {
            return Err(SalienceError::Config("keywords must not be empty".to_string()));
        }
        for (name, value) in [
            ("base_value", self.base_value),
            ("hit_value", self.hit_value),
            ("max_value", self.max_value),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SalienceError::Config(format!(
                    "{} must be within [0.0, 1.0], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Value = clamp(base + hits x increment, 0, max), counting each configured
/// keyword at most once as a case-insensitive whole word.
///
/// This scorer is stateless; `reset` is a no-op.
#[derive(Debug, Clone)]
pub struct KeywordValue {
    config: KeywordValueConfig,
    patterns: Vec<Regex>,
}

impl KeywordValue {
    pub fn new(config: KeywordValueConfig) -> Result<Self, SalienceError> {
        config.validate()?;
        let patterns = config
            .keywords
            .iter()
            .map(|k| Regex::new(&format!(r"\b{}\b", regex::escape(&k.to_lowercase()))))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SalienceError::Config(e.to_string()))?;
        Ok(Self { config, patterns })
    }

    pub fn config(&self) -> &KeywordValueConfig {
        &self.config
    }

    fn hits(&self, text: &str) -> usize {
        let lowered = text.to_lowercase();
        self.patterns.iter().filter(|p| p.is_match(&lowered)).count()
    }
}

impl Scorer for KeywordValue {
    fn method(&self) -> &'static str {
        "keyword_imperative"
    }

    fn score(&mut self, text: &str) -> Result<Score, SalienceError> {
        let hits = self.hits(text);
        let raw = self.config.base_value + self.config.hit_value * hits as f64;
        let value = raw.clamp(0.0, self.config.max_value);

        Ok(Score::new(value)
            .with_diagnostic("keyword_hits", hits as f64)
            .with_diagnostic("keyword_count", self.config.keywords.len() as f64)
            .with_diagnostic("base_value", self.config.base_value)
            .with_provenance("value_method", self.method())
            .with_provenance("keyword_count", self.config.keywords.len().to_string())
            .with_provenance("keyword_hits", hits.to_string())
            .with_provenance("base_value", self.config.base_value.to_string())
            .with_provenance("hit_value", self.config.hit_value.to_string())
            .with_provenance("max_value", self.config.max_value.to_string()))
    }

    fn reset(&mut self) {}
}
