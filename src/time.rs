//! Time abstraction traits for platform-agnostic timing.
//!
//! The scheduler only ever needs "now" and whole milliseconds between two
//! instants, so the traits stay that small. `std` types implement them out
//! of the box, and [`SystemClock`] is the wall-clock source for real hosts.

use std::time::{Duration, Instant};

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to whole milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Trait for abstracting time sources.
pub trait TimeSource {
    /// Instant type produced by this source.
    type Instant: TimeInstant;

    /// Returns the current time instant.
    fn now(&self) -> Self::Instant;
}

impl TimeDuration for Duration {
    const ZERO: Self = Duration::ZERO;

    fn as_millis(&self) -> u64 {
        u64::try_from(Duration::as_millis(self)).unwrap_or(u64::MAX)
    }

    fn from_millis(millis: u64) -> Self {
        Duration::from_millis(millis)
    }
}

impl TimeInstant for Instant {
    type Duration = Duration;

    fn duration_since(&self, earlier: Self) -> Duration {
        self.saturating_duration_since(earlier)
    }
}

/// Monotonic wall clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_duration_reports_whole_millis() {
        let d = Duration::from_micros(2_750);
        assert_eq!(TimeDuration::as_millis(&d), 2);
        assert_eq!(<Duration as TimeDuration>::from_millis(250), Duration::from_millis(250));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(TimeDuration::as_millis(&b.duration_since(a)) < 1_000);
    }
}
