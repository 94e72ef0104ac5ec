// Copyright 2026 the Line Profiler Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources for the profiler.
//!
//! A [`Clock`] is a value owned by each [`LineProfiler`](crate::LineProfiler); there is no
//! process-global clock state, so independent profilers (and tests) never interfere.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source used to timestamp line boundaries.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant: Copy;

    /// Returns the current timestamp.
    fn now(&self) -> Self::Instant;

    /// Returns the time elapsed from `earlier` to `later`.
    ///
    /// Never negative: if `later` precedes `earlier` the result is [`Duration::ZERO`].
    fn elapsed(&self, earlier: Self::Instant, later: Self::Instant) -> Duration;
}

/// Wall-clock time source backed by [`std::time::Instant`].
#[derive(Copy, Clone, Debug, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    type Instant = Instant;

    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn elapsed(&self, earlier: Instant, later: Instant) -> Duration {
        later.saturating_duration_since(earlier)
    }
}

/// Manually driven clock.
///
/// Instants are offsets from an arbitrary origin. Clones share the same reading, so a test can
/// hand one clone to a profiler and keep another to advance time between boundaries.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current reading.
    ///
    /// Going backwards is allowed; elapsed times are clamped to zero.
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Moves the current reading forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }
}

impl Clock for ManualClock {
    type Instant = Duration;

    #[inline]
    fn now(&self) -> Duration {
        self.now.get()
    }

    #[inline]
    fn elapsed(&self, earlier: Duration, later: Duration) -> Duration {
        later.saturating_sub(earlier)
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, MonotonicClock};
    use std::time::Duration;

    #[test]
    fn monotonic_elapsed_is_never_negative() {
        let clock = MonotonicClock;
        let t0 = clock.now();
        let t1 = clock.now();
        assert_eq!(clock.elapsed(t1, t0), Duration::ZERO);
        assert!(clock.elapsed(t0, t1) >= Duration::ZERO);
    }

    #[test]
    fn manual_clones_share_reading() {
        let clock = ManualClock::new();
        let other = clock.clone();
        other.advance(Duration::from_nanos(5));
        assert_eq!(clock.now(), Duration::from_nanos(5));
    }

    #[test]
    fn manual_regression_clamps_to_zero() {
        let clock = ManualClock::new();
        clock.set(Duration::from_secs(10));
        let later = clock.now();
        clock.set(Duration::from_secs(3));
        let earlier = clock.now();
        assert_eq!(clock.elapsed(later, earlier), Duration::ZERO);
        assert_eq!(clock.elapsed(earlier, later), Duration::from_secs(7));
    }
}
