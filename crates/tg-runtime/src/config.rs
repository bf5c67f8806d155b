//! Validated run configuration
//!
//! Loaded with the `config` crate from an optional YAML/TOML/JSON file plus
//! `TG__<SECTION>__<KEY>` environment overrides. Missing keys take the
//! defaults below; unknown keys and out-of-range values are errors.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tg_clock::{ClockConfig, SalienceMode};
use tg_memory::{DecayEngine, DecayLaw, MemoryError};
use tg_salience::{
    KeywordValue, KeywordValueConfig, SalienceError, SaliencePipeline, TokenOverlapNovelty,
    DEFAULT_KEYWORDS,
};
use tg_telemetry::SchemaOptions;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "TG";

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// `salience` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SalienceSettings {
    /// Novelty history length (>= 1)
    pub window_size: usize,
    /// Value keywords; must not be empty
    pub keywords: Vec<String>,
    pub base_value: f64,
    pub hit_value: f64,
    pub max_value: f64,
}

impl Default for SalienceSettings {
    fn default() -> Self {
        Self {
            window_size: 5,
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            base_value: 0.1,
            hit_value: 0.2,
            max_value: 1.0,
        }
    }
}

/// `clock` section, mirrors [`ClockConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockSettings {
    pub base_dilation_factor: f64,
    pub min_clock_rate: f64,
    pub max_clock_rate: f64,
    pub salience_mode: SalienceMode,
    pub legacy_density_scale: f64,
    pub strict_psi_bounds: bool,
}

impl Default for ClockSettings {
    fn default() -> Self {
        let clock = ClockConfig::default();
        Self {
            base_dilation_factor: clock.base_dilation_factor,
            min_clock_rate: clock.min_clock_rate,
            max_clock_rate: clock.max_clock_rate,
            salience_mode: clock.salience_mode,
            legacy_density_scale: clock.legacy_density_scale,
            strict_psi_bounds: clock.strict_psi_bounds,
        }
    }
}

/// `memory` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemorySettings {
    /// Half-life in tau, used when `decay_lambda` is unset
    pub half_life: f64,
    /// Overrides `half_life` when set
    pub decay_lambda: Option<f64>,
    /// Sweeps evict at or below this projected strength
    pub prune_threshold: f64,
    /// Minimum psi that encodes a memory
    pub encode_threshold: f64,
    /// Strength given to an event with psi = 1
    pub initial_strength_max: f64,
    /// Reconsolidation ceiling
    pub s_max: f64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            half_life: 20.0,
            decay_lambda: Some(0.05),
            prune_threshold: 0.2,
            encode_threshold: 0.3,
            initial_strength_max: tg_memory::INITIAL_STRENGTH_MAX,
            s_max: tg_memory::S_MAX,
        }
    }
}

/// `policies` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySettings {
    /// Seed for memory ids
    pub deterministic_seed: u64,
    /// Wall seconds between consecutive events
    pub event_wall_delta: f64,
    /// Minimum tau between encodes
    pub cooldown_tau: f64,
    /// Idle wall time before the calibration sweep
    pub calibration_post_sweep_wall_delta: f64,
    /// Require PROVENANCE_HASH when validating packets
    pub replay_require_provenance_hash: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            deterministic_seed: 1337,
            event_wall_delta: 1.0,
            cooldown_tau: 0.0,
            calibration_post_sweep_wall_delta: 5.0,
            replay_require_provenance_hash: false,
        }
    }
}

/// Immutable configuration for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemporalGradientConfig {
    pub salience: SalienceSettings,
    pub clock: ClockSettings,
    pub memory: MemorySettings,
    pub policies: PolicySettings,
}

fn check(ok: bool, message: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}

fn unit(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl TemporalGradientConfig {
    /// Load from an optional file plus process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let mut environment = ::config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("salience.keywords");
        if let Some(env) = env {
            environment = environment.source(Some(env.into_iter().collect()));
        }

        let settings = builder.add_source(environment).build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text without consulting the environment
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(yaml, ::config::FileFormat::Yaml))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.salience;
        check(s.window_size >= 1, "salience.window_size must be >= 1")?;
        check(!s.keywords.is_empty(), "salience.keywords must be a non-empty list of strings")?;
        check(
            s.keywords.iter().all(|k| !k.trim().is_empty()),
            "salience.keywords must not contain blank entries",
        )?;
        check(unit(s.base_value), "salience.base_value must be within [0.0, 1.0]")?;
        check(unit(s.hit_value), "salience.hit_value must be within [0.0, 1.0]")?;
        check(unit(s.max_value), "salience.max_value must be within [0.0, 1.0]")?;

        let c = &self.clock;
        check(positive(c.base_dilation_factor), "clock.base_dilation_factor must be > 0.0")?;
        check(
            positive(c.min_clock_rate) && c.min_clock_rate <= 1.0,
            "clock.min_clock_rate must be within (0.0, 1.0]",
        )?;
        check(
            positive(c.max_clock_rate) && c.max_clock_rate <= 1.0,
            "clock.max_clock_rate must be within (0.0, 1.0]",
        )?;
        check(
            c.min_clock_rate <= c.max_clock_rate,
            "clock.min_clock_rate must be <= clock.max_clock_rate",
        )?;
        check(positive(c.legacy_density_scale), "clock.legacy_density_scale must be > 0.0")?;

        let m = &self.memory;
        check(positive(m.half_life), "memory.half_life must be > 0.0")?;
        if let Some(lambda) = m.decay_lambda {
            check(lambda.is_finite() && lambda >= 0.0, "memory.decay_lambda must be >= 0.0")?;
        }
        check(unit(m.prune_threshold), "memory.prune_threshold must be within [0.0, 1.0]")?;
        check(unit(m.encode_threshold), "memory.encode_threshold must be within [0.0, 1.0]")?;
        check(positive(m.s_max), "memory.s_max must be > 0.0")?;
        check(positive(m.initial_strength_max), "memory.initial_strength_max must be > 0.0")?;
        check(
            m.initial_strength_max <= m.s_max,
            "memory.initial_strength_max must be <= memory.s_max",
        )?;

        let p = &self.policies;
        check(positive(p.event_wall_delta), "policies.event_wall_delta must be > 0.0")?;
        check(
            p.cooldown_tau.is_finite() && p.cooldown_tau >= 0.0,
            "policies.cooldown_tau must be >= 0.0",
        )?;
        check(
            positive(p.calibration_post_sweep_wall_delta),
            "policies.calibration_post_sweep_wall_delta must be > 0.0",
        )?;
        Ok(())
    }

    /// Token-overlap novelty and keyword value over the salience section
    pub fn salience_pipeline(&self) -> Result<SaliencePipeline, SalienceError> {
        let s = &self.salience;
        let novelty = TokenOverlapNovelty::with_window(s.window_size)?;
        let value = KeywordValue::new(KeywordValueConfig {
            keywords: s.keywords.clone(),
            base_value: s.base_value,
            hit_value: s.hit_value,
            max_value: s.max_value,
        })?;
        Ok(SaliencePipeline::new(Box::new(novelty), Box::new(value)))
    }

    pub fn clock_config(&self) -> ClockConfig {
        let c = &self.clock;
        ClockConfig {
            base_dilation_factor: c.base_dilation_factor,
            min_clock_rate: c.min_clock_rate,
            max_clock_rate: c.max_clock_rate,
            salience_mode: c.salience_mode,
            legacy_density_scale: c.legacy_density_scale,
            strict_psi_bounds: c.strict_psi_bounds,
        }
    }

    /// `decay_lambda` wins over `half_life` when present
    pub fn decay_law(&self) -> DecayLaw {
        match self.memory.decay_lambda {
            Some(lambda) => DecayLaw::Lambda(lambda),
            None => DecayLaw::HalfLife(self.memory.half_life),
        }
    }

    pub fn decay_engine(&self) -> Result<DecayEngine, MemoryError> {
        DecayEngine::new(self.decay_law(), self.memory.prune_threshold, self.memory.s_max)
    }

    pub fn schema_options(&self) -> SchemaOptions {
        SchemaOptions {
            require_provenance_hash: self.policies.replay_require_provenance_hash,
            clock_rate_bounds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TemporalGradientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.salience.keywords.len(), 7);
        assert_eq!(config.decay_law(), DecayLaw::Lambda(0.05));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = TemporalGradientConfig::from_yaml_str(
            "salience:\n  window_size: 3\n  keywords: [must, critical, immediate]\nmemory:\n  decay_lambda: 0.05\n",
        )
        .unwrap();
        assert_eq!(config.salience.window_size, 3);
        assert_eq!(config.salience.base_value, 0.1);
        assert_eq!(config.clock.min_clock_rate, 0.05);
        assert_eq!(config.decay_law(), DecayLaw::Lambda(0.05));
    }

    #[test]
    fn test_half_life_used_without_lambda() {
        let config = TemporalGradientConfig {
            memory: MemorySettings {
                half_life: 10.0,
                decay_lambda: None,
                ..MemorySettings::default()
            },
            ..TemporalGradientConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.decay_law(), DecayLaw::HalfLife(10.0));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            TemporalGradientConfig::from_yaml_str("salience:\n  windw_size: 3\n"),
            Err(ConfigError::Load(_))
        ));
        assert!(matches!(
            TemporalGradientConfig::from_yaml_str("extras:\n  a: 1\n"),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_out_of_range_values() {
        let cases = [
            ("salience:\n  window_size: 0\n", "salience.window_size"),
            ("clock:\n  min_clock_rate: 0.0\n", "clock.min_clock_rate"),
            ("clock:\n  min_clock_rate: 0.8\n  max_clock_rate: 0.5\n", "clock.min_clock_rate"),
            ("memory:\n  initial_strength_max: 2.0\n", "memory.initial_strength_max"),
            ("memory:\n  decay_lambda: -0.1\n", "memory.decay_lambda"),
            ("policies:\n  event_wall_delta: 0.0\n", "policies.event_wall_delta"),
        ];
        for (yaml, key) in cases {
            match TemporalGradientConfig::from_yaml_str(yaml) {
                Err(ConfigError::Invalid(msg)) => assert!(msg.starts_with(key), "{}", msg),
                other => panic!("{:?} for {}", other, yaml),
            }
        }
    }

    #[test]
    fn test_blank_keywords_rejected() {
        let mut config = TemporalGradientConfig::default();
        config.salience.keywords.clear();
        assert!(config.validate().is_err());
        config.salience.keywords = vec!["  ".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_and_env_overrides() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "clock:\n  base_dilation_factor: 2.0\npolicies:\n  cooldown_tau: 1.5").unwrap();

        let env: HashMap<String, String> = [
            ("TG__POLICIES__DETERMINISTIC_SEED", "42"),
            ("TG__SALIENCE__KEYWORDS", "alpha,beta"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = TemporalGradientConfig::load_with_env(Some(file.path()), Some(env)).unwrap();
        assert_eq!(config.clock.base_dilation_factor, 2.0);
        assert_eq!(config.policies.cooldown_tau, 1.5);
        assert_eq!(config.policies.deterministic_seed, 42);
        assert_eq!(config.salience.keywords, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let result = TemporalGradientConfig::load_with_env(
            Some(Path::new("/nonexistent/tg.yaml")),
            Some(HashMap::new()),
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_builds_components() {
        let config = TemporalGradientConfig::default();
        let mut pipeline = config.salience_pipeline().unwrap();
        assert!(pipeline.evaluate("stop the pump").unwrap().psi > 0.0);
        assert!(config.decay_engine().unwrap().is_empty());
        assert_eq!(config.clock_config(), ClockConfig::default());
    }
}
