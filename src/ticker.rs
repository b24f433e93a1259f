//! Per-channel tick state machine.

use crate::scheduler::ServoDriver;
use crate::time::{TimeDuration, TimeInstant};
use crate::transition::Transition;
use crate::types::ChannelId;

/// Lifecycle of a channel within one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickState {
    /// Transition bound but not started.
    Pending,
    /// Moving toward the end position.
    Running,
    /// End position reached. Further ticks hold it.
    Complete,
}

/// Drives one servo through one [`Transition`], tick by tick.
///
/// Every call to [`tick`](Self::tick) writes exactly one position to the
/// driver, including the terminal tick and any tick after completion.
#[derive(Debug, Clone)]
pub struct ChannelTicker<I: TimeInstant> {
    channel: ChannelId,
    transition: Transition,
    start_time: Option<I>,
    state: TickState,
    position: f32,
}

impl<I: TimeInstant> ChannelTicker<I> {
    /// Creates a pending ticker positioned at the transition's start.
    pub fn new(channel: ChannelId, transition: Transition) -> Self {
        Self {
            channel,
            transition,
            start_time: None,
            state: TickState::Pending,
            position: transition.start(),
        }
    }

    /// Starts the transition clock. `Pending` becomes `Running`.
    ///
    /// Calling this again restarts the transition from `now`.
    pub fn initialize(&mut self, now: I) {
        self.start_time = Some(now);
        self.state = TickState::Running;
    }

    /// Rebinds the transition for a new frame and returns to `Pending`.
    ///
    /// # Errors
    /// * `ZeroDuration` - `duration_ms` is zero; the ticker is left untouched
    pub fn retarget(&mut self, start: f32, end: f32, duration_ms: u32) -> Result<(), crate::MotionError> {
        self.transition.rebind(start, end, duration_ms)?;
        self.start_time = None;
        self.state = TickState::Pending;
        self.position = start;
        Ok(())
    }

    /// Advances the channel to `now` and writes its position.
    ///
    /// A pending ticker is initialized at `now` first. Once the duration has
    /// elapsed the end position is written exactly and the ticker completes,
    /// however late the tick arrives.
    pub fn tick<S: ServoDriver>(&mut self, now: I, driver: &mut S) -> TickState {
        let start_time = match (self.state, self.start_time) {
            (TickState::Complete, _) => {
                self.write(self.transition.end(), driver);
                return TickState::Complete;
            }
            (TickState::Running, Some(start_time)) => start_time,
            _ => {
                self.initialize(now);
                now
            }
        };

        let elapsed = now.duration_since(start_time).as_millis();
        if elapsed >= u64::from(self.transition.duration_ms()) {
            self.write(self.transition.end(), driver);
            self.state = TickState::Complete;
            return self.state;
        }

        let position = self.transition.ease(elapsed);
        self.write(position, driver);

        // Curves that land on the end early finish early.
        if position == self.transition.end() {
            self.state = TickState::Complete;
        }
        self.state
    }

    fn write<S: ServoDriver>(&mut self, position: f32, driver: &mut S) {
        driver.set_position(self.channel, position);
        self.position = position;
    }

    /// Channel this ticker drives.
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Current state.
    pub fn state(&self) -> TickState {
        self.state
    }

    /// Last position written, or the start position before the first tick.
    pub fn position(&self) -> f32 {
        self.position
    }

    /// The bound transition.
    pub fn transition(&self) -> &Transition {
        &self.transition
    }
}
