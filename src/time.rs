//! Time abstraction traits for platform-agnostic timing.
//!
//! The scheduler only ever asks two things of a clock: "what time is it" and
//! "how long since then". Implement [`TimeSource`] and [`TimeInstant`] for
//! your platform timer, or use [`WrappingMillis`] directly on top of a free
//! running 32-bit millisecond counter.

/// Trait for abstracting time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates the forward duration since an earlier instant.
    ///
    /// Implementations must never go negative. Counters that wrap must return
    /// the wrapping difference rather than panicking or saturating.
    fn duration_since(&self, earlier: Self) -> Self::Duration;
}

/// Millisecond duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u64);

impl TimeDuration for Millis {
    const ZERO: Self = Millis(0);

    #[inline]
    fn as_millis(&self) -> u64 {
        self.0
    }

    #[inline]
    fn from_millis(millis: u64) -> Self {
        Millis(millis)
    }
}

/// Instant read from a free-running `u32` millisecond counter.
///
/// The counter wraps after roughly 49.7 days. Differences are taken with
/// wrapping arithmetic, so an elapsed time is always the forward distance from
/// `earlier` to `self` as long as the real interval is shorter than one full
/// counter period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WrappingMillis(pub u32);

impl TimeInstant for WrappingMillis {
    type Duration = Millis;

    #[inline]
    fn duration_since(&self, earlier: Self) -> Millis {
        Millis(u64::from(self.0.wrapping_sub(earlier.0)))
    }
}
