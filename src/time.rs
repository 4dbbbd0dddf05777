//! Time abstraction traits for platform-agnostic timing.
//!
//! The head unit never sleeps or waits; every timed behavior (debounce window,
//! long-press threshold, auto-cycle period, config idle timeout) is evaluated
//! by comparing the elapsed time between two instants against a threshold on
//! each poll tick.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Returns true once `self` has reached `threshold`.
    #[inline]
    fn reached(&self, threshold: Self) -> bool {
        self.as_millis() >= threshold.as_millis()
    }
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    ///
    /// Implementations backed by wrapping tick counters should use wrapping
    /// subtraction so that elapsed-time checks survive counter rollover.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

