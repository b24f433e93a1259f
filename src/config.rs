//! Startup configuration for the scheduler and the load monitor.

use crate::types::{MotionError, position_in_range};

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Number of servos under control, addressed as channels `0..channels`.
    pub channels: usize,

    /// Sleep between lockstep iterations.
    pub tick_interval_ms: u32,

    /// Position every channel is driven to before the first frame.
    pub home_position: f32,
}

impl MotionConfig {
    /// Default sleep between lockstep iterations (50 Hz).
    pub const DEFAULT_TICK_INTERVAL_MS: u32 = 20;

    /// Creates a configuration for `channels` servos homed at center.
    pub const fn new(channels: usize) -> Self {
        Self {
            channels,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            home_position: 0.0,
        }
    }

    /// Sets the sleep between lockstep iterations.
    pub const fn tick_interval_ms(mut self, tick_interval_ms: u32) -> Self {
        self.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Sets the home position.
    pub const fn home_position(mut self, home_position: f32) -> Self {
        self.home_position = home_position;
        self
    }

    /// Validates against a channel capacity `C`.
    ///
    /// # Errors
    /// * `EmptyFrame` - `channels` is zero
    /// * `CapacityExceeded` - `channels` exceeds `capacity` or the 256 channel id space
    /// * `ZeroDuration` - `tick_interval_ms` is zero
    /// * `PositionOutOfRange` - `home_position` is outside `[-1.0, 1.0]`
    pub fn validate(&self, capacity: usize) -> Result<(), MotionError> {
        if self.channels == 0 {
            return Err(MotionError::EmptyFrame);
        }
        if self.channels > capacity || self.channels > usize::from(u8::MAX) + 1 {
            return Err(MotionError::CapacityExceeded);
        }
        if self.tick_interval_ms == 0 {
            return Err(MotionError::ZeroDuration);
        }
        if !position_in_range(self.home_position) {
            return Err(MotionError::PositionOutOfRange(self.home_position));
        }
        Ok(())
    }
}

/// Supply current limits for the load monitor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadLimits {
    /// Rated supply current; a load of 1.0 means this many amps.
    pub rated_amps: f32,

    /// Current above which the interlock trips.
    pub limit_amps: f32,
}

impl LoadLimits {
    /// Creates a limit pair.
    ///
    /// # Errors
    /// * `InvalidRange` - Either value is not finite and positive
    pub fn new(rated_amps: f32, limit_amps: f32) -> Result<Self, MotionError> {
        let valid = |amps: f32| amps.is_finite() && amps > 0.0;
        if !valid(rated_amps) || !valid(limit_amps) {
            return Err(MotionError::InvalidRange {
                min: limit_amps,
                max: rated_amps,
            });
        }
        Ok(Self {
            rated_amps,
            limit_amps,
        })
    }
}

impl Default for LoadLimits {
    /// 3 A rated with a 2 A trip point.
    fn default() -> Self {
        Self {
            rated_amps: 3.0,
            limit_amps: 2.0,
        }
    }
}
