#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Easing`**: Curve mapping normalized time to normalized progress (`Linear`, quadratic variants, `Custom`)
//! - **`Transition`**: An easing curve bound to a start position, end position and duration
//! - **`ChannelTicker`**: Moves one servo through one transition, one tick at a time
//! - **`Frame`**: Per-channel targets that are reached together
//! - **`SequenceSource`**: Supplies frames, either from a cyclic `FrameTable` or a `ByteDecoder`
//! - **`MotionScheduler`**: Plays frames on a servo array in lockstep
//! - **`Interlock`**: One-shot latch that halts the scheduler
//! - **`LoadMonitor`**: Watches supply current and trips the interlock on overcurrent
//! - **`ServoDriver`**: Trait to implement for your servo hardware
//! - **`TimeSource`**: Trait to implement for your timing system
//!
//! Positions are `f32` in `[-1.0, 1.0]`. When implementing `ServoDriver` for
//! your hardware, convert these to pulse widths or duty cycles.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

/// Emits a defmt log line when the `defmt` feature is enabled.
macro_rules! log {
    ($level:ident, $($arg:tt)*) => {
        #[cfg(feature = "defmt")]
        defmt::$level!($($arg)*);
    };
}
pub(crate) use log;

pub mod colors;
pub mod config;
pub mod easing;
pub mod frame;
pub mod interlock;
pub mod monitor;
pub mod scheduler;
pub mod source;
pub mod ticker;
pub mod time;
pub mod transition;
pub mod types;

pub use config::{LoadLimits, MotionConfig};
pub use easing::Easing;
pub use frame::{ChannelTarget, Frame, FrameBuilder};
pub use interlock::Interlock;
pub use monitor::{BarMeter, CurrentSensor, LedBar, LoadIndicator, LoadMonitor, MonitorStatus};
pub use scheduler::{MotionScheduler, RunOutcome, SchedulerState, ServoDriver, StepOutcome};
pub use source::{ByteDecoder, ByteFrames, ByteStream, FrameTable, SequenceSource};
pub use ticker::{ChannelTicker, TickState};
pub use time::{Millis, TimeDuration, TimeInstant, TimeSource, WrappingMillis};
pub use transition::Transition;
pub use types::{ChannelId, MotionError, POSITION_MAX, POSITION_MIN};
