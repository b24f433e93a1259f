//! Core types shared across the motion engine.

/// Identifier of a single servo output.
///
/// Channels are numbered from zero up to the channel count configured on the
/// scheduler. The scheduler ticks channels in ascending id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub u8);

impl From<u8> for ChannelId {
    fn from(id: u8) -> Self {
        ChannelId(id)
    }
}

impl From<ChannelId> for usize {
    fn from(id: ChannelId) -> Self {
        id.0 as usize
    }
}

/// Lowest position a servo accepts.
pub const POSITION_MIN: f32 = -1.0;

/// Highest position a servo accepts.
pub const POSITION_MAX: f32 = 1.0;

/// Returns true if `position` is finite and inside the servo range.
#[inline]
pub(crate) fn position_in_range(position: f32) -> bool {
    position.is_finite() && (POSITION_MIN..=POSITION_MAX).contains(&position)
}

/// Configuration errors.
///
/// All of these are raised while building transitions, frames, sources or the
/// scheduler itself. Nothing in the steady-state run loop returns an error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// A transition or frame entry has a zero duration.
    ZeroDuration,

    /// A frame table or byte buffer holds no frames.
    EmptySource,

    /// A frame has no channel entries.
    EmptyFrame,

    /// The same channel appears twice in one frame.
    DuplicateChannel(ChannelId),

    /// A frame addresses a channel the scheduler does not control.
    UnknownChannel {
        /// Offending channel.
        channel: ChannelId,
        /// Number of channels under control.
        channels: usize,
    },

    /// A position is not finite or lies outside `[-1.0, 1.0]`.
    PositionOutOfRange(f32),

    /// A byte decoder range has `min` and `max` reversed or out of bounds.
    InvalidRange {
        /// Configured minimum.
        min: f32,
        /// Configured maximum.
        max: f32,
    },

    /// A byte decoder was asked to take zero bytes per frame.
    ZeroTake,

    /// A fixed-capacity container is full.
    CapacityExceeded,
}

impl core::fmt::Display for MotionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotionError::ZeroDuration => {
                write!(f, "transition duration must be greater than zero")
            }
            MotionError::EmptySource => {
                write!(f, "sequence source must contain at least one frame")
            }
            MotionError::EmptyFrame => {
                write!(f, "frame must move at least one channel")
            }
            MotionError::DuplicateChannel(channel) => {
                write!(f, "channel {} appears more than once in frame", channel.0)
            }
            MotionError::UnknownChannel { channel, channels } => {
                write!(
                    f,
                    "channel {} is not under control (scheduler drives {} channels)",
                    channel.0, channels
                )
            }
            MotionError::PositionOutOfRange(position) => {
                write!(f, "position {} outside servo range [-1.0, 1.0]", position)
            }
            MotionError::InvalidRange { min, max } => {
                write!(f, "invalid position range: min {} max {}", min, max)
            }
            MotionError::ZeroTake => {
                write!(f, "byte decoder must take at least one byte per frame")
            }
            MotionError::CapacityExceeded => {
                write!(f, "capacity exceeded")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}
