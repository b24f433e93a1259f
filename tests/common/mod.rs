//! Shared test infrastructure for servo-sequencer integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use core::cell::Cell;
use servo_sequencer::{
    ChannelId, Interlock, Millis, ServoDriver, Srgb, TimeDuration, TimeInstant, TimeSource,
    WrappingMillis,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock instant type for testing (milliseconds since boot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = Millis;

    fn duration_since(&self, earlier: Self) -> Millis {
        Millis::from_millis(self.0 - earlier.0)
    }
}

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<u64>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(0),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u64) {
        self.current_time.set(self.current_time.get() + millis);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        TestInstant(self.current_time.get())
    }
}

/// Mock 32-bit millisecond counter that wraps
pub struct WrappingTimeSource {
    counter: Cell<u32>,
}

impl WrappingTimeSource {
    pub fn starting_at(counter: u32) -> Self {
        Self {
            counter: Cell::new(counter),
        }
    }

    pub fn advance(&self, millis: u32) {
        self.counter.set(self.counter.get().wrapping_add(millis));
    }
}

impl TimeSource<WrappingMillis> for WrappingTimeSource {
    fn now(&self) -> WrappingMillis {
        WrappingMillis(self.counter.get())
    }
}

// ============================================================================
// Mock Servo Driver
// ============================================================================

/// Mock servo bank that records every position write
pub struct MockServos {
    writes: heapless::Vec<(ChannelId, f32), 1024>,
    colors: heapless::Vec<(ChannelId, Srgb), 64>,
    positions: [f32; 8],
}

impl MockServos {
    pub fn new() -> Self {
        Self {
            writes: heapless::Vec::new(),
            colors: heapless::Vec::new(),
            positions: [f32::NAN; 8],
        }
    }

    pub fn writes(&self) -> &[(ChannelId, f32)] {
        &self.writes
    }

    pub fn colors(&self) -> &[(ChannelId, Srgb)] {
        &self.colors
    }

    pub fn position(&self, channel: u8) -> f32 {
        self.positions[channel as usize]
    }

    /// Writes addressed to one channel, in order
    pub fn writes_to(&self, channel: u8) -> impl Iterator<Item = f32> + '_ {
        self.writes
            .iter()
            .filter(move |(id, _)| *id == ChannelId(channel))
            .map(|(_, position)| *position)
    }
}

impl ServoDriver for MockServos {
    fn set_position(&mut self, channel: ChannelId, position: f32) {
        self.positions[channel.0 as usize] = position;
        let _ = self.writes.push((channel, position));
    }

    fn show_color(&mut self, channel: ChannelId, color: Srgb) {
        let _ = self.colors.push((channel, color));
    }
}

// ============================================================================
// Mock Delay
// ============================================================================

/// Delay that advances a mock clock instead of sleeping, optionally tripping
/// an interlock after a number of sleeps
pub struct MockDelay<'a> {
    timer: &'a MockTimeSource,
    trip: Option<(&'a Interlock, u32)>,
    sleeps: u32,
}

impl<'a> MockDelay<'a> {
    pub fn new(timer: &'a MockTimeSource) -> Self {
        Self {
            timer,
            trip: None,
            sleeps: 0,
        }
    }

    /// Trips `interlock` during the `sleeps`-th sleep
    pub fn tripping_after(mut self, interlock: &'a Interlock, sleeps: u32) -> Self {
        self.trip = Some((interlock, sleeps));
        self
    }

    pub fn sleeps(&self) -> u32 {
        self.sleeps
    }

    fn sleep(&mut self, millis: u64) {
        self.timer.advance(millis);
        self.sleeps += 1;
        if let Some((interlock, after)) = self.trip {
            if self.sleeps >= after {
                interlock.trip();
            }
        }
    }
}

impl embedded_hal::delay::DelayNs for MockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.sleep(u64::from(ns) / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.sleep(u64::from(ms));
    }
}

impl embedded_hal_async::delay::DelayNs for MockDelay<'_> {
    async fn delay_ns(&mut self, ns: u32) {
        self.sleep(u64::from(ns) / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.sleep(u64::from(ms));
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two positions with floating-point tolerance
pub fn positions_equal(a: f32, b: f32) -> bool {
    const EPSILON: f32 = 0.0001;
    (a - b).abs() < EPSILON
}
