//! Multi-channel motion scheduler with interlock-aware run loops.
//!
//! Provides [`MotionScheduler`] which plays frames from a [`SequenceSource`]
//! on an array of servos, advancing every channel of a frame in lockstep until
//! all of them reach their targets. Also defines the [`ServoDriver`] trait for
//! hardware abstraction.

use crate::config::MotionConfig;
use crate::frame::Frame;
use crate::interlock::Interlock;
use crate::source::SequenceSource;
use crate::ticker::{ChannelTicker, TickState};
use crate::time::{TimeInstant, TimeSource};
use crate::transition::Transition;
use crate::types::{ChannelId, MotionError};
use heapless::Vec;
use palette::Srgb;

/// Trait for abstracting servo output hardware.
///
/// Implement this for your PWM or servo controller to let the scheduler drive
/// it.
pub trait ServoDriver {
    /// Moves `channel` to `position` in `[-1.0, 1.0]`.
    ///
    /// Handle any hardware errors internally - this method cannot fail.
    fn set_position(&mut self, channel: ChannelId, position: f32);

    /// Shows the indicator color a frame attached to `channel`.
    ///
    /// Called once per frame for each target that carries a color. The
    /// default implementation ignores colors.
    fn show_color(&mut self, channel: ChannelId, color: Srgb) {
        let _ = (channel, color);
    }
}

/// The current state of a motion scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    /// Not started. Servos have not been homed.
    Idle,
    /// Homed and playing frames.
    Moving,
    /// Stopped by the interlock. Terminal.
    Halted,
    /// A one-shot source ran out of frames. Terminal.
    Exhausted,
}

/// Result of one lockstep iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    /// At least one channel is still moving. Sleep, then step again.
    Moving,
    /// Every channel reached its target. The next step starts a new frame.
    FrameComplete,
    /// The interlock is tripped. No further motion will happen.
    Halted,
    /// The source has no more frames.
    Exhausted,
}

/// Why a run loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunOutcome {
    /// The interlock tripped.
    Halted {
        /// Frames fully played before the trip.
        frames: u32,
    },
    /// The source ran out of frames.
    Exhausted {
        /// Frames fully played.
        frames: u32,
    },
}

/// Plays frames on an array of servos.
///
/// Each frame binds one [`ChannelTicker`] per target. Every iteration ticks
/// all of them, in ascending channel order, against one shared timestamp, so
/// no channel runs ahead of the others. Channels that finish early keep
/// receiving their end position until the slowest channel is done.
///
/// The [`Interlock`] is polled before every iteration. Once it trips the
/// scheduler stops where it is, without finishing the frame in flight.
///
/// # Type Parameters
/// * `'a` - Lifetime of the time source, interlock and byte buffer borrows
/// * `I` - Time instant type
/// * `S` - Servo driver type
/// * `T` - Time source type
/// * `C` - Maximum number of channels
/// * `F` - Maximum number of frames in a table source
pub struct MotionScheduler<'a, I, S, T, const C: usize, const F: usize>
where
    I: TimeInstant,
    S: ServoDriver,
    T: TimeSource<I>,
{
    driver: S,
    time_source: &'a T,
    interlock: &'a Interlock,
    source: SequenceSource<'a, C, F>,
    config: MotionConfig,
    tickers: Vec<ChannelTicker<I>, C>,
    positions: [f32; C],
    state: SchedulerState,
    frames_completed: u32,
}

impl<'a, I, S, T, const C: usize, const F: usize> MotionScheduler<'a, I, S, T, C, F>
where
    I: TimeInstant,
    S: ServoDriver,
    T: TimeSource<I>,
{
    /// Creates an idle scheduler. Nothing is written to the servos yet.
    ///
    /// # Errors
    /// Any configuration problem: an invalid [`MotionConfig`], or a source
    /// whose frames address channels outside `0..config.channels`.
    pub fn new(
        config: MotionConfig,
        driver: S,
        time_source: &'a T,
        interlock: &'a Interlock,
        source: SequenceSource<'a, C, F>,
    ) -> Result<Self, MotionError> {
        config.validate(C)?;
        source.check_channels(config.channels)?;

        Ok(Self {
            driver,
            time_source,
            interlock,
            source,
            config,
            tickers: Vec::new(),
            positions: [config.home_position; C],
            state: SchedulerState::Idle,
            frames_completed: 0,
        })
    }

    /// Runs until the interlock trips or the source is exhausted, sleeping
    /// on `delay` between iterations.
    ///
    /// With the interlock already tripped this returns at once without
    /// touching the servos.
    pub fn run<D: embedded_hal::delay::DelayNs>(&mut self, delay: &mut D) -> Result<RunOutcome, MotionError> {
        loop {
            if let Some(outcome) = self.step_until_done()? {
                return Ok(outcome);
            }
            delay.delay_ms(self.config.tick_interval_ms);
        }
    }

    /// Cooperative variant of [`run`](Self::run) that yields to the executor
    /// between iterations.
    pub async fn run_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> Result<RunOutcome, MotionError> {
        loop {
            if let Some(outcome) = self.step_until_done()? {
                return Ok(outcome);
            }
            delay.delay_ms(self.config.tick_interval_ms).await;
        }
    }

    fn step_until_done(&mut self) -> Result<Option<RunOutcome>, MotionError> {
        let frames = self.frames_completed;
        Ok(match self.step()? {
            StepOutcome::Halted => Some(RunOutcome::Halted { frames }),
            StepOutcome::Exhausted => Some(RunOutcome::Exhausted { frames }),
            StepOutcome::Moving | StepOutcome::FrameComplete => None,
        })
    }

    /// Performs one lockstep iteration.
    ///
    /// Polls the interlock, homes the servos on the very first call, starts
    /// the next frame if none is in flight, then ticks every channel once.
    /// Use this to embed the scheduler in an existing loop; `run` is just this
    /// plus a sleep.
    ///
    /// # Errors
    /// * `UnknownChannel` - A frame addresses a channel outside the configured set
    pub fn step(&mut self) -> Result<StepOutcome, MotionError> {
        match self.state {
            SchedulerState::Halted => return Ok(StepOutcome::Halted),
            SchedulerState::Exhausted => return Ok(StepOutcome::Exhausted),
            SchedulerState::Idle | SchedulerState::Moving => {}
        }

        if self.interlock.is_tripped() {
            self.halt();
            return Ok(StepOutcome::Halted);
        }

        if self.state == SchedulerState::Idle {
            self.home();
            self.state = SchedulerState::Moving;
        }

        if self.tickers.is_empty() && !self.start_next_frame()? {
            crate::log!(info, "sequence exhausted after {} frames", self.frames_completed);
            self.state = SchedulerState::Exhausted;
            return Ok(StepOutcome::Exhausted);
        }

        let now = self.time_source.now();
        let mut complete = true;
        for ticker in self.tickers.iter_mut() {
            let state = ticker.tick(now, &mut self.driver);
            self.positions[usize::from(ticker.channel())] = ticker.position();
            complete &= state == TickState::Complete;
        }

        if !complete {
            return Ok(StepOutcome::Moving);
        }

        self.frames_completed = self.frames_completed.wrapping_add(1);
        self.tickers.clear();
        crate::log!(debug, "frame {} complete", self.frames_completed);
        Ok(StepOutcome::FrameComplete)
    }

    /// Drives every channel to the home position.
    fn home(&mut self) {
        crate::log!(info, "homing {} channels", self.config.channels);
        for channel in 0..self.config.channels {
            self.driver
                .set_position(ChannelId(channel as u8), self.config.home_position);
            self.positions[channel] = self.config.home_position;
        }
    }

    /// Pulls the next frame and binds a ticker per target.
    ///
    /// Returns false if the source is exhausted.
    fn start_next_frame(&mut self) -> Result<bool, MotionError> {
        let Some(frame) = self.source.next_frame() else {
            return Ok(false);
        };
        self.bind_frame(&frame)?;
        Ok(true)
    }

    fn bind_frame(&mut self, frame: &Frame<C>) -> Result<(), MotionError> {
        frame.check_channels(self.config.channels)?;

        self.tickers.clear();
        let now = self.time_source.now();
        for target in frame.targets() {
            let start = target
                .start
                .unwrap_or(self.positions[usize::from(target.channel)]);
            let transition = Transition::new(start, target.end, target.duration_ms, frame.easing())?;
            let mut ticker = ChannelTicker::new(target.channel, transition);
            ticker.initialize(now);
            self.tickers
                .push(ticker)
                .map_err(|_| MotionError::CapacityExceeded)?;

            if let Some(color) = target.color {
                self.driver.show_color(target.channel, color);
            }
        }

        crate::log!(
            debug,
            "frame {} started: {} channels over {} ms",
            self.frames_completed + 1,
            frame.len(),
            frame.duration_ms()
        );
        Ok(())
    }

    fn halt(&mut self) {
        crate::log!(
            warn,
            "interlock tripped, halting with {} channels in flight",
            self.tickers.len()
        );
        self.tickers.clear();
        self.state = SchedulerState::Halted;
    }

    /// Returns the current state of the scheduler.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Last position written to each channel, indexed by channel id.
    pub fn positions(&self) -> &[f32] {
        &self.positions[..self.config.channels]
    }

    /// Number of frames played to completion.
    pub fn frames_completed(&self) -> u32 {
        self.frames_completed
    }

    /// True while a frame is in flight.
    pub fn is_moving(&self) -> bool {
        !self.tickers.is_empty()
    }

    /// The active configuration.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Returns a reference to the servo driver.
    pub fn driver(&self) -> &S {
        &self.driver
    }

    /// Consumes the scheduler and hands back the servo driver.
    pub fn into_driver(self) -> S {
        self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ChannelTarget;
    use crate::source::FrameTable;
    use crate::time::{Millis, TimeDuration};
    use core::cell::Cell;

    #[derive(Debug, Clone, Copy)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = Millis;

        fn duration_since(&self, earlier: Self) -> Millis {
            Millis::from_millis(self.0 - earlier.0)
        }
    }

    struct MockTimeSource {
        current_time: Cell<u64>,
    }

    impl MockTimeSource {
        fn new() -> Self {
            Self {
                current_time: Cell::new(0),
            }
        }

        fn advance(&self, millis: u64) {
            self.current_time.set(self.current_time.get() + millis);
        }
    }

    impl TimeSource<TestInstant> for MockTimeSource {
        fn now(&self) -> TestInstant {
            TestInstant(self.current_time.get())
        }
    }

    struct MockDriver {
        writes: Vec<(ChannelId, f32), 64>,
    }

    impl ServoDriver for MockDriver {
        fn set_position(&mut self, channel: ChannelId, position: f32) {
            let _ = self.writes.push((channel, position));
        }
    }

    fn driver() -> MockDriver {
        MockDriver { writes: Vec::new() }
    }

    fn swing(a: f32, b: f32) -> Frame<2> {
        Frame::builder()
            .target(ChannelTarget::new(ChannelId(0), a, 100))
            .unwrap()
            .target(ChannelTarget::new(ChannelId(1), b, 100))
            .unwrap()
            .build()
            .unwrap()
    }

    fn table() -> SequenceSource<'static, 2, 2> {
        FrameTable::<2, 2>::from_slice(&[swing(1.0, -1.0), swing(-1.0, 1.0)])
            .unwrap()
            .into()
    }

    #[test]
    fn new_rejects_frames_outside_channel_set() {
        let timer = MockTimeSource::new();
        let interlock = Interlock::new();
        let result = MotionScheduler::new(MotionConfig::new(1), driver(), &timer, &interlock, table());
        assert!(matches!(result, Err(MotionError::UnknownChannel { .. })));
    }

    #[test]
    fn first_step_homes_then_writes_start() {
        let timer = MockTimeSource::new();
        let interlock = Interlock::new();
        let mut scheduler =
            MotionScheduler::new(MotionConfig::new(2), driver(), &timer, &interlock, table()).unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        assert_eq!(scheduler.step().unwrap(), StepOutcome::Moving);
        assert_eq!(scheduler.state(), SchedulerState::Moving);
        assert_eq!(
            scheduler.driver().writes.as_slice(),
            &[
                (ChannelId(0), 0.0),
                (ChannelId(1), 0.0),
                (ChannelId(0), 0.0),
                (ChannelId(1), 0.0),
            ]
        );
    }

    #[test]
    fn frames_chain_from_previous_end_positions() {
        let timer = MockTimeSource::new();
        let interlock = Interlock::new();
        let mut scheduler =
            MotionScheduler::new(MotionConfig::new(2), driver(), &timer, &interlock, table()).unwrap();

        scheduler.step().unwrap();
        timer.advance(50);
        scheduler.step().unwrap();
        assert_eq!(scheduler.positions(), &[0.5, -0.5]);

        timer.advance(50);
        assert_eq!(scheduler.step().unwrap(), StepOutcome::FrameComplete);
        assert_eq!(scheduler.positions(), &[1.0, -1.0]);
        assert!(!scheduler.is_moving());

        // Second frame starts where the first one ended.
        assert_eq!(scheduler.step().unwrap(), StepOutcome::Moving);
        assert_eq!(scheduler.positions(), &[1.0, -1.0]);
        timer.advance(50);
        scheduler.step().unwrap();
        assert_eq!(scheduler.positions(), &[0.0, 0.0]);
        assert_eq!(scheduler.frames_completed(), 1);
    }

    #[test]
    fn interlock_stops_mid_frame() {
        let timer = MockTimeSource::new();
        let interlock = Interlock::new();
        let mut scheduler =
            MotionScheduler::new(MotionConfig::new(2), driver(), &timer, &interlock, table()).unwrap();

        scheduler.step().unwrap();
        timer.advance(50);
        scheduler.step().unwrap();
        let writes = scheduler.driver().writes.len();

        interlock.trip();
        timer.advance(50);
        assert_eq!(scheduler.step().unwrap(), StepOutcome::Halted);
        assert_eq!(scheduler.state(), SchedulerState::Halted);
        assert_eq!(scheduler.driver().writes.len(), writes);
        assert_eq!(scheduler.positions(), &[0.5, -0.5]);

        // Halting is terminal.
        assert_eq!(scheduler.step().unwrap(), StepOutcome::Halted);
    }
}
