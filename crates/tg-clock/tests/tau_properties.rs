//! Properties of tau accumulation

use proptest::prelude::*;
use tg_clock::{ClockConfig, ClockRateModulator, SalienceMode};

proptest! {
    #[test]
    fn tau_is_monotone_and_bounded_by_wall(
        ticks in prop::collection::vec((0.0f64..=1.0, 0.0f64..5.0), 1..30),
    ) {
        let mut clock = ClockRateModulator::new(ClockConfig::default()).unwrap();
        let mut last = 0.0;
        for (psi, wall) in &ticks {
            let record = clock.tick(*psi, Some(*wall)).unwrap();
            prop_assert!(record.tau >= last);
            last = record.tau;
        }
        prop_assert!(clock.tau() <= clock.wall_elapsed() + 1e-9);
        prop_assert!(clock.tau() >= clock.wall_elapsed() * 0.05 - 1e-9);
    }

    #[test]
    fn legacy_density_psi_is_bounded(text in ".{0,200}") {
        let mut clock = ClockRateModulator::new(ClockConfig {
            salience_mode: SalienceMode::LegacyDensity,
            ..ClockConfig::default()
        })
        .unwrap();
        let record = clock.tick_with_context(None, Some(&text), Some(1.0)).unwrap();
        prop_assert!((0.0..=1.0).contains(&record.psi));
        prop_assert!(record.density.is_some());
    }

    #[test]
    fn negative_wall_delta_is_rejected(psi in 0.0f64..1.0, wall in -100.0f64..-1e-9) {
        let mut clock = ClockRateModulator::new(ClockConfig::default()).unwrap();
        prop_assert!(clock.tick(psi, Some(wall)).is_err());
        prop_assert_eq!(clock.tau(), 0.0);
        prop_assert!(clock.chronology().is_empty());
    }
}
