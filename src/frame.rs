//! Frames: one set of per-channel targets reached together.

use crate::easing::Easing;
use crate::types::{ChannelId, MotionError, position_in_range};
use heapless::Vec;
use palette::Srgb;

/// Where one channel should go during a frame.
#[derive(Debug, Clone, Copy)]
pub struct ChannelTarget {
    /// Servo to move.
    pub channel: ChannelId,

    /// Start position. `None` starts from wherever the channel currently is.
    pub start: Option<f32>,

    /// End position.
    pub end: f32,

    /// Time to reach `end`.
    pub duration_ms: u32,

    /// Indicator color shown while this frame runs.
    pub color: Option<Srgb>,
}

impl ChannelTarget {
    /// Creates a target moving `channel` to `end` from its current position.
    #[inline]
    pub fn new(channel: ChannelId, end: f32, duration_ms: u32) -> Self {
        Self {
            channel,
            start: None,
            end,
            duration_ms,
            color: None,
        }
    }

    /// Starts the move from an explicit position instead.
    #[inline]
    pub fn starting_at(mut self, start: f32) -> Self {
        self.start = Some(start);
        self
    }

    /// Attaches an indicator color.
    #[inline]
    pub fn with_color(mut self, color: Srgb) -> Self {
        self.color = Some(color);
        self
    }

    fn validate(&self) -> Result<(), MotionError> {
        if self.duration_ms == 0 {
            return Err(MotionError::ZeroDuration);
        }
        if let Some(start) = self.start {
            if !position_in_range(start) {
                return Err(MotionError::PositionOutOfRange(start));
            }
        }
        if !position_in_range(self.end) {
            return Err(MotionError::PositionOutOfRange(self.end));
        }
        Ok(())
    }
}

/// A validated set of channel targets.
///
/// Targets are stored in ascending channel order and every channel appears at
/// most once.
///
/// # Type Parameters
/// * `C` - Maximum number of channels one frame can move
#[derive(Debug, Clone)]
pub struct Frame<const C: usize> {
    targets: Vec<ChannelTarget, C>,
    easing: Easing,
}

impl<const C: usize> Frame<C> {
    /// Creates a new frame builder.
    pub fn builder() -> FrameBuilder<C> {
        FrameBuilder::new()
    }

    /// Assembles a frame from targets the caller has already validated.
    pub(crate) fn from_validated(targets: Vec<ChannelTarget, C>, easing: Easing) -> Self {
        Self { targets, easing }
    }

    /// Targets in ascending channel order.
    pub fn targets(&self) -> &[ChannelTarget] {
        &self.targets
    }

    /// Easing curve applied to every channel of this frame.
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Returns the target for `channel`, if this frame moves it.
    pub fn target(&self, channel: ChannelId) -> Option<&ChannelTarget> {
        self.targets.iter().find(|target| target.channel == channel)
    }

    /// Number of channels this frame moves.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Always false for a built frame.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Longest channel duration, the nominal length of the frame.
    pub fn duration_ms(&self) -> u32 {
        self.targets
            .iter()
            .map(|target| target.duration_ms)
            .max()
            .unwrap_or(0)
    }

    /// Checks that every channel lies inside a scheduler driving `channels` servos.
    ///
    /// # Errors
    /// * `UnknownChannel` - A target addresses a channel id `>= channels`
    pub fn check_channels(&self, channels: usize) -> Result<(), MotionError> {
        match self
            .targets
            .iter()
            .find(|target| usize::from(target.channel) >= channels)
        {
            Some(target) => Err(MotionError::UnknownChannel {
                channel: target.channel,
                channels,
            }),
            None => Ok(()),
        }
    }
}

/// Builder for constructing validated frames.
#[derive(Debug)]
pub struct FrameBuilder<const C: usize> {
    targets: Vec<ChannelTarget, C>,
    easing: Easing,
}

impl<const C: usize> FrameBuilder<C> {
    /// Creates a new empty frame builder using linear easing.
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            easing: Easing::Linear,
        }
    }

    /// Adds a channel target.
    ///
    /// # Errors
    /// * `CapacityExceeded` - The frame already holds `C` targets
    pub fn target(mut self, target: ChannelTarget) -> Result<Self, MotionError> {
        self.targets
            .push(target)
            .map_err(|_| MotionError::CapacityExceeded)?;
        Ok(self)
    }

    /// Sets the easing curve for every channel in the frame.
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Builds and validates the frame.
    ///
    /// # Errors
    /// * `EmptyFrame` - No targets were added
    /// * `ZeroDuration` - A target has zero duration
    /// * `PositionOutOfRange` - A start or end position is outside `[-1.0, 1.0]`
    /// * `DuplicateChannel` - Two targets address the same channel
    pub fn build(mut self) -> Result<Frame<C>, MotionError> {
        if self.targets.is_empty() {
            return Err(MotionError::EmptyFrame);
        }

        for target in &self.targets {
            target.validate()?;
        }

        self.targets.sort_unstable_by_key(|target| target.channel);
        for pair in self.targets.windows(2) {
            if pair[0].channel == pair[1].channel {
                return Err(MotionError::DuplicateChannel(pair[0].channel));
            }
        }

        Ok(Frame {
            targets: self.targets,
            easing: self.easing,
        })
    }
}

impl<const C: usize> Default for FrameBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sorts_targets_by_channel() {
        let frame = Frame::<4>::builder()
            .target(ChannelTarget::new(ChannelId(2), 0.5, 100))
            .unwrap()
            .target(ChannelTarget::new(ChannelId(0), -0.5, 300))
            .unwrap()
            .target(ChannelTarget::new(ChannelId(1), 0.0, 200))
            .unwrap()
            .build()
            .unwrap();

        let channels: heapless::Vec<ChannelId, 4> =
            frame.targets().iter().map(|target| target.channel).collect();
        assert_eq!(channels.as_slice(), &[ChannelId(0), ChannelId(1), ChannelId(2)]);
        assert_eq!(frame.duration_ms(), 300);
        assert_eq!(frame.target(ChannelId(2)).unwrap().end, 0.5);
    }

    #[test]
    fn builder_rejects_empty_frame() {
        assert_eq!(Frame::<4>::builder().build().unwrap_err(), MotionError::EmptyFrame);
    }

    #[test]
    fn builder_rejects_duplicate_channel() {
        let result = Frame::<4>::builder()
            .target(ChannelTarget::new(ChannelId(1), 0.5, 100))
            .unwrap()
            .target(ChannelTarget::new(ChannelId(1), -0.5, 100))
            .unwrap()
            .build();
        assert_eq!(result.unwrap_err(), MotionError::DuplicateChannel(ChannelId(1)));
    }

    #[test]
    fn builder_rejects_zero_duration_and_bad_positions() {
        let zero = Frame::<2>::builder()
            .target(ChannelTarget::new(ChannelId(0), 0.5, 0))
            .unwrap()
            .build();
        assert_eq!(zero.unwrap_err(), MotionError::ZeroDuration);

        let too_far = Frame::<2>::builder()
            .target(ChannelTarget::new(ChannelId(0), 1.5, 100))
            .unwrap()
            .build();
        assert_eq!(too_far.unwrap_err(), MotionError::PositionOutOfRange(1.5));

        let bad_start = Frame::<2>::builder()
            .target(ChannelTarget::new(ChannelId(0), 0.0, 100).starting_at(-2.0))
            .unwrap()
            .build();
        assert_eq!(bad_start.unwrap_err(), MotionError::PositionOutOfRange(-2.0));
    }

    #[test]
    fn builder_reports_capacity_exceeded() {
        let result = Frame::<1>::builder()
            .target(ChannelTarget::new(ChannelId(0), 0.0, 100))
            .unwrap()
            .target(ChannelTarget::new(ChannelId(1), 0.0, 100));
        assert!(matches!(result, Err(MotionError::CapacityExceeded)));
    }

    #[test]
    fn check_channels_rejects_unknown_channel() {
        let frame = Frame::<2>::builder()
            .target(ChannelTarget::new(ChannelId(0), 0.0, 100))
            .unwrap()
            .target(ChannelTarget::new(ChannelId(5), 0.0, 100))
            .unwrap()
            .build()
            .unwrap();

        assert!(frame.check_channels(6).is_ok());
        assert_eq!(
            frame.check_channels(4),
            Err(MotionError::UnknownChannel {
                channel: ChannelId(5),
                channels: 4
            })
        );
    }
}
