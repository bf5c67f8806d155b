//! Clock-rate reparameterization of wall time into internal time (tau)

use serde::{Deserialize, Serialize};

use crate::density::{information_density, psi_from_density};
use crate::error::ClockError;
use crate::time_source::TimeSource;

/// How psi reaches the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalienceMode {
    /// psi is supplied by the salience pipeline
    #[default]
    Canonical,
    /// psi may be derived from text density (migration path only)
    LegacyDensity,
}

/// Clock-rate modulator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// How strongly psi slows the clock (> 0)
    pub base_dilation_factor: f64,
    /// Floor so tau never stalls (0 < min <= max)
    pub min_clock_rate: f64,
    /// Ceiling on the rate (<= 1)
    pub max_clock_rate: f64,
    /// Where psi comes from
    pub salience_mode: SalienceMode,
    /// Divisor mapping information density onto psi (> 0)
    pub legacy_density_scale: f64,
    /// Reject psi > 1 in canonical mode instead of clamping
    pub strict_psi_bounds: bool,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            base_dilation_factor: 1.0,
            min_clock_rate: 0.05,
            max_clock_rate: 1.0,
            salience_mode: SalienceMode::Canonical,
            legacy_density_scale: 100.0,
            strict_psi_bounds: false,
        }
    }
}

impl ClockConfig {
    /// Validate ranges: dilation > 0, 0 < min <= max <= 1, density scale > 0
    pub fn validate(&self) -> Result<(), ClockError> {
        let invalid = |msg: &str| Err(ClockError::InvalidConfig(msg.to_string()));
        let all_finite = [
            self.base_dilation_factor,
            self.min_clock_rate,
            self.max_clock_rate,
            self.legacy_density_scale,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return invalid("clock settings must be finite numbers");
        }
        if self.base_dilation_factor <= 0.0 {
            return invalid("base_dilation_factor must be > 0.0");
        }
        if self.min_clock_rate <= 0.0 || self.min_clock_rate > 1.0 {
            return invalid("min_clock_rate must be within (0.0, 1.0]");
        }
        if self.max_clock_rate <= 0.0 || self.max_clock_rate > 1.0 {
            return invalid("max_clock_rate must be within (0.0, 1.0]");
        }
        if self.min_clock_rate > self.max_clock_rate {
            return invalid("min_clock_rate must be <= max_clock_rate");
        }
        if self.legacy_density_scale <= 0.0 {
            return invalid("legacy_density_scale must be > 0.0");
        }
        Ok(())
    }
}

/// One entry of the chronology log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub wall_delta: f64,
    /// tau after this tick
    pub tau: f64,
    /// psi after policy canonicalization
    pub psi: f64,
    pub clock_rate: f64,
    pub tau_delta: f64,
    /// Raw density when psi was derived from text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

/// Advances tau by `wall_delta x rate(psi)`.
///
/// `rate(psi) = clamp(1 / (1 + psi x base_dilation), min_rate, max_rate)`.
/// The same psi policy runs for [`clock_rate_from_psi`](Self::clock_rate_from_psi)
/// and [`tick`](Self::tick), so a preview always agrees with the tick.
#[derive(Debug)]
pub struct ClockRateModulator {
    config: ClockConfig,
    tau: f64,
    wall_elapsed: f64,
    last_wall: Option<f64>,
    time_source: Option<Box<dyn TimeSource>>,
    chronology: Vec<TickRecord>,
}

impl ClockRateModulator {
    /// Modulator driven only by explicit `wall_delta` values
    pub fn new(config: ClockConfig) -> Result<Self, ClockError> {
        config.validate()?;
        Ok(Self {
            config,
            tau: 0.0,
            wall_elapsed: 0.0,
            last_wall: None,
            time_source: None,
            chronology: Vec::new(),
        })
    }

    /// Modulator that derives `wall_delta` from a time source when none is given
    pub fn with_time_source(
        config: ClockConfig,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, ClockError> {
        let mut modulator = Self::new(config)?;
        modulator.last_wall = Some(time_source.now());
        modulator.time_source = Some(time_source);
        Ok(modulator)
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Internal time accumulated so far
    pub fn tau(&self) -> f64 {
        self.tau
    }

    /// Wall time accounted for by ticks so far
    pub fn wall_elapsed(&self) -> f64 {
        self.wall_elapsed
    }

    /// Append-only tick log
    pub fn chronology(&self) -> &[TickRecord] {
        &self.chronology
    }

    /// Apply the psi policy for the configured mode
    pub fn canonicalize_psi(&self, psi: f64) -> Result<f64, ClockError> {
        if !psi.is_finite() {
            return Err(ClockError::NonFinitePsi(psi));
        }
        let psi = psi.max(0.0);
        if self.config.salience_mode == SalienceMode::Canonical && psi > 1.0 {
            if self.config.strict_psi_bounds {
                return Err(ClockError::PsiOutOfBounds(psi));
            }
            return Ok(1.0);
        }
        Ok(psi)
    }

    fn rate_for(&self, psi: f64) -> f64 {
        let rate = 1.0 / (1.0 + psi * self.config.base_dilation_factor);
        rate.clamp(self.config.min_clock_rate, self.config.max_clock_rate)
    }

    /// Clock rate for psi under the same policy as `tick`
    pub fn clock_rate_from_psi(&self, psi: f64) -> Result<f64, ClockError> {
        Ok(self.rate_for(self.canonicalize_psi(psi)?))
    }

    /// Advance tau with a pipeline-supplied psi
    pub fn tick(&mut self, psi: f64, wall_delta: Option<f64>) -> Result<TickRecord, ClockError> {
        self.tick_with_context(Some(psi), None, wall_delta)
    }

    /// Advance tau; in legacy-density mode a missing psi is derived from `input_context`.
    ///
    /// Canonical mode never consults `input_context` and rejects a missing psi.
    pub fn tick_with_context(
        &mut self,
        psi: Option<f64>,
        input_context: Option<&str>,
        wall_delta: Option<f64>,
    ) -> Result<TickRecord, ClockError> {
        let mut density = None;
        let raw_psi = match (psi, self.config.salience_mode) {
            (Some(psi), _) => psi,
            (None, SalienceMode::Canonical) => return Err(ClockError::MissingPsi),
            (None, SalienceMode::LegacyDensity) => {
                let text = input_context.ok_or(ClockError::MissingInputContext)?;
                let d = information_density(text);
                density = Some(d);
                psi_from_density(d, self.config.legacy_density_scale)
            }
        };
        let psi = self.canonicalize_psi(raw_psi)?;
        let wall_delta = self.resolve_wall_delta(wall_delta)?;

        let clock_rate = self.rate_for(psi);
        let tau_delta = wall_delta * clock_rate;
        self.tau += tau_delta;
        self.wall_elapsed += wall_delta;

        let record = TickRecord {
            wall_delta,
            tau: self.tau,
            psi,
            clock_rate,
            tau_delta,
            density,
        };
        tracing::trace!(
            tau = record.tau,
            psi = record.psi,
            clock_rate = record.clock_rate,
            tau_delta = record.tau_delta,
            "Clock tick"
        );
        self.chronology.push(record.clone());
        Ok(record)
    }

    fn resolve_wall_delta(&mut self, wall_delta: Option<f64>) -> Result<f64, ClockError> {
        match wall_delta {
            Some(delta) => {
                if !delta.is_finite() || delta < 0.0 {
                    return Err(ClockError::NegativeWallDelta(delta));
                }
                if let Some(last) = self.last_wall.as_mut() {
                    *last += delta;
                }
                Ok(delta)
            }
            None => match (&self.time_source, self.last_wall) {
                (Some(source), Some(last)) => {
                    let now = source.now();
                    self.last_wall = Some(now);
                    Ok((now - last).max(0.0))
                }
                _ => Err(ClockError::MissingWallDelta),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::ManualClock;

    fn modulator(config: ClockConfig) -> ClockRateModulator {
        ClockRateModulator::new(config).unwrap()
    }

    #[test]
    fn test_rate_at_zero_is_one() {
        let clock = modulator(ClockConfig::default());
        assert_eq!(clock.clock_rate_from_psi(0.0).unwrap(), 1.0);
        assert_eq!(clock.clock_rate_from_psi(1.0).unwrap(), 0.5);
    }

    #[test]
    fn test_rate_floor() {
        let clock = modulator(ClockConfig {
            base_dilation_factor: 100.0,
            min_clock_rate: 0.05,
            ..Default::default()
        });
        assert_eq!(clock.clock_rate_from_psi(1.0).unwrap(), 0.05);
    }

    #[test]
    fn test_rate_ceiling() {
        let clock = modulator(ClockConfig {
            max_clock_rate: 0.8,
            ..Default::default()
        });
        assert_eq!(clock.clock_rate_from_psi(0.0).unwrap(), 0.8);
    }

    #[test]
    fn test_tick_accumulates_tau() {
        let mut clock = modulator(ClockConfig::default());
        let rec = clock.tick(1.0, Some(2.0)).unwrap();
        assert_eq!(rec.tau_delta, 1.0);
        clock.tick(0.0, Some(1.0)).unwrap();
        assert_eq!(clock.tau(), 2.0);
        assert_eq!(clock.wall_elapsed(), 3.0);
        assert_eq!(clock.chronology().len(), 2);
    }

    #[test]
    fn test_negative_psi_clamps_to_zero() {
        let mut clock = modulator(ClockConfig::default());
        let rec = clock.tick(-3.0, Some(1.0)).unwrap();
        assert_eq!(rec.psi, 0.0);
        assert_eq!(rec.clock_rate, 1.0);
    }

    #[test]
    fn test_non_strict_clamps_above_one() {
        let mut clock = modulator(ClockConfig::default());
        let preview = clock.clock_rate_from_psi(2.0).unwrap();
        let rec = clock.tick(2.0, Some(1.0)).unwrap();
        assert_eq!(rec.psi, 1.0);
        assert_eq!(preview, rec.clock_rate);
    }

    #[test]
    fn test_strict_rejects_above_one_for_preview_and_tick() {
        let mut clock = modulator(ClockConfig {
            strict_psi_bounds: true,
            ..Default::default()
        });
        assert_eq!(
            clock.clock_rate_from_psi(1.5),
            Err(ClockError::PsiOutOfBounds(1.5))
        );
        assert_eq!(clock.tick(1.5, Some(1.0)), Err(ClockError::PsiOutOfBounds(1.5)));
        assert!(clock.chronology().is_empty());
        assert_eq!(clock.tau(), 0.0);
    }

    #[test]
    fn test_non_finite_psi_rejected() {
        let mut clock = modulator(ClockConfig::default());
        assert!(matches!(
            clock.tick(f64::NAN, Some(1.0)),
            Err(ClockError::NonFinitePsi(_))
        ));
        assert!(matches!(
            clock.clock_rate_from_psi(f64::INFINITY),
            Err(ClockError::NonFinitePsi(_))
        ));
    }

    #[test]
    fn test_negative_wall_delta_rejected() {
        let mut clock = modulator(ClockConfig::default());
        assert_eq!(
            clock.tick(0.5, Some(-1.0)),
            Err(ClockError::NegativeWallDelta(-1.0))
        );
    }

    #[test]
    fn test_missing_wall_delta_without_time_source() {
        let mut clock = modulator(ClockConfig::default());
        assert_eq!(clock.tick(0.5, None), Err(ClockError::MissingWallDelta));
        assert!(clock.chronology().is_empty());
        assert_eq!(clock.tau(), 0.0);
        assert_eq!(clock.wall_elapsed(), 0.0);
    }

    #[test]
    fn test_canonical_requires_psi() {
        let mut clock = modulator(ClockConfig::default());
        assert_eq!(
            clock.tick_with_context(None, Some("text"), Some(1.0)),
            Err(ClockError::MissingPsi)
        );
    }

    #[test]
    fn test_legacy_density_derives_psi() {
        let mut clock = modulator(ClockConfig {
            salience_mode: SalienceMode::LegacyDensity,
            legacy_density_scale: 8.0,
            ..Default::default()
        });
        // "abab": density 4.0 -> psi 0.5
        let rec = clock.tick_with_context(None, Some("abab"), Some(1.0)).unwrap();
        assert_eq!(rec.density, Some(4.0));
        assert_eq!(rec.psi, 0.5);
        assert_eq!(
            clock.tick_with_context(None, None, Some(1.0)),
            Err(ClockError::MissingInputContext)
        );
    }

    #[test]
    fn test_time_source_drives_wall_delta() {
        let source = ManualClock::new(100.0);
        let mut clock =
            ClockRateModulator::with_time_source(ClockConfig::default(), Box::new(source.clone()))
                .unwrap();
        source.advance(3.0);
        let rec = clock.tick(0.0, None).unwrap();
        assert_eq!(rec.wall_delta, 3.0);

        // An explicit delta moves the mark forward without reading the source
        clock.tick(0.0, Some(1.0)).unwrap();
        source.advance(2.0);
        let rec = clock.tick(0.0, None).unwrap();
        assert_eq!(rec.wall_delta, 1.0);
    }

    #[test]
    fn test_invalid_config() {
        for config in [
            ClockConfig {
                base_dilation_factor: 0.0,
                ..Default::default()
            },
            ClockConfig {
                min_clock_rate: 0.9,
                max_clock_rate: 0.5,
                ..Default::default()
            },
            ClockConfig {
                max_clock_rate: 1.5,
                ..Default::default()
            },
            ClockConfig {
                legacy_density_scale: -1.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                ClockRateModulator::new(config),
                Err(ClockError::InvalidConfig(_))
            ));
        }
    }
}
