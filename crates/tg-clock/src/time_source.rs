//! Injected time sources
//!
//! The modulator never reads the system clock on its own; callers pass
//! either an explicit `wall_delta` or a [`TimeSource`].

use chrono::Utc;
use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;

/// A source of wall-clock readings in seconds
pub trait TimeSource: Debug {
    fn now(&self) -> f64;
}

/// Reads the system wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> f64 {
        Utc::now().timestamp_micros() as f64 / 1_000_000.0
    }
}

/// Deterministic clock advanced by hand.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the modulator.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(10.0);
        let handle = clock.clone();
        handle.advance(2.5);
        assert_eq!(clock.now(), 12.5);
        clock.set(1.0);
        assert_eq!(handle.now(), 1.0);
    }

    #[test]
    fn test_system_clock_is_positive() {
        assert!(SystemClock.now() > 0.0);
    }
}
