//! Time sources.
//!
//! The animation loop asks a [`Clock`] for "now" instead of reading the wall
//! clock directly, so propagation can be driven and tested without waiting.
use std::cell::Cell;

use hifitime::{Duration, Epoch, Unit};
use log::warn;

/// Something that can tell the current instant.
pub trait Clock {
    fn now(&self) -> Epoch;
}

/// Wall clock, UTC.
///
/// Reports the UNIX reference instant (1970-01-01T00:00:00 UTC) when the
/// host clock cannot be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Epoch {
        Epoch::now().unwrap_or_else(|e| {
            warn!("cannot read system time: {e}");
            Epoch::from_unix_seconds(0.0)
        })
    }
}

/// A clock that only moves when told to.
///
/// Each [`Clock::now`] call returns the current instant; [`SteppedClock::tick`]
/// advances it by one step, as one animation frame would.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    current: Cell<Epoch>,
    step: Duration,
}

impl SteppedClock {
    pub fn new(start: Epoch, step: Duration) -> Self {
        SteppedClock {
            current: Cell::new(start),
            step,
        }
    }

    /// Clock stepping at `rate_hz` frames per second.
    pub fn at_rate(start: Epoch, rate_hz: f64) -> Self {
        Self::new(start, Unit::Second * (1.0 / rate_hz))
    }

    /// Advance by one step and return the new instant.
    pub fn tick(&self) -> Epoch {
        self.advance(self.step)
    }

    /// Advance by an arbitrary duration and return the new instant.
    pub fn advance(&self, by: Duration) -> Epoch {
        let next = self.current.get() + by;
        self.current.set(next);
        next
    }

    /// Jump to a given instant.
    pub fn set(&self, instant: Epoch) {
        self.current.set(instant);
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Epoch {
        self.current.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Epoch {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_system_clock_is_recent() {
        let now = SystemClock.now();
        let y2024 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        assert!(now > y2024);
    }

    #[test]
    fn test_stepped_clock() {
        let start = Epoch::from_gregorian_utc_hms(2024, 1, 1, 12, 0, 0);
        let clock = SteppedClock::at_rate(start, 60.0);
        assert_eq!(clock.now(), start);

        for _ in 0..60 {
            clock.tick();
        }
        assert_relative_eq!((clock.now() - start).to_seconds(), 1.0, epsilon = 1e-6);

        clock.advance(Unit::Minute * 1.0);
        assert_relative_eq!((clock.now() - start).to_seconds(), 61.0, epsilon = 1e-6);

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
