//! A single eased move between two positions.

use crate::easing::Easing;
use crate::types::MotionError;

/// An easing curve bound to a concrete start, end and duration.
///
/// The three motion parameters can be rebound between frames with
/// [`rebind`](Self::rebind) so one transition per channel is reused for the
/// whole run. Rebinding validates and replaces all three at once; there is no
/// way to observe a half-updated transition.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    start: f32,
    end: f32,
    duration_ms: u32,
    easing: Easing,
}

impl Transition {
    /// Creates a transition.
    ///
    /// # Errors
    /// * `ZeroDuration` - `duration_ms` is zero
    pub fn new(start: f32, end: f32, duration_ms: u32, easing: Easing) -> Result<Self, MotionError> {
        if duration_ms == 0 {
            return Err(MotionError::ZeroDuration);
        }

        Ok(Self {
            start,
            end,
            duration_ms,
            easing,
        })
    }

    /// Replaces start, end and duration in one step, keeping the easing curve.
    ///
    /// On error the transition is left untouched.
    ///
    /// # Errors
    /// * `ZeroDuration` - `duration_ms` is zero
    pub fn rebind(&mut self, start: f32, end: f32, duration_ms: u32) -> Result<(), MotionError> {
        *self = Self::new(start, end, duration_ms, self.easing)?;
        Ok(())
    }

    /// Position after `elapsed_ms` milliseconds.
    ///
    /// Maps `easing(elapsed / duration)` affinely onto the start..end span.
    /// Once `elapsed_ms` reaches the duration the result is exactly `end`;
    /// the curve is never evaluated past the boundary.
    #[inline]
    pub fn ease(&self, elapsed_ms: u64) -> f32 {
        if elapsed_ms >= u64::from(self.duration_ms) {
            return self.end;
        }

        let t = elapsed_ms as f32 / self.duration_ms as f32;
        self.easing.apply(t) * (self.end - self.start) + self.start
    }

    /// Start position.
    pub fn start(&self) -> f32 {
        self.start
    }

    /// End position.
    pub fn end(&self) -> f32 {
        self.end
    }

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Easing curve.
    pub fn easing(&self) -> Easing {
        self.easing
    }
}
