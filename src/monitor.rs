//! Supply current monitoring and the load bar indicator.
//!
//! [`LoadMonitor`] is the task on the other side of the [`Interlock`]. It
//! samples the servo supply current, reports the load fraction to a
//! [`LoadIndicator`], and trips the interlock the first time the current
//! exceeds the configured limit. It never touches scheduler state.

use crate::colors::{bar_hue, hsv};
use crate::config::LoadLimits;
use crate::interlock::Interlock;
use palette::Srgb;

/// Trait for abstracting the supply current sense input.
pub trait CurrentSensor {
    /// Returns the present supply current in amps.
    fn read_current(&mut self) -> f32;
}

/// Trait for anything that can display a load fraction.
pub trait LoadIndicator {
    /// Shows `load`, where 1.0 is the rated current. May exceed 1.0.
    fn show_load(&mut self, load: f32);
}

/// Trait for abstracting an addressable LED strip used as a bar graph.
pub trait LedBar {
    /// Sets LED `index` to `color`.
    fn set_led(&mut self, index: usize, color: Srgb);

    /// Pushes buffered colors to the strip. The default does nothing.
    fn show(&mut self) {}
}

/// Outcome of one monitor sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MonitorStatus {
    /// Current within limits; carries the load fraction.
    Load(f32),
    /// Current above the limit; carries the measured amps.
    Overcurrent(f32),
}

/// Renders the load as an `N` LED bar, green at the bottom to red at the top.
///
/// LED `i` is lit when `load >= (i + 0.5) / N` and dimmed otherwise.
pub struct BarMeter<B: LedBar, const N: usize> {
    bar: B,
    brightness_on: f32,
    brightness_off: f32,
}

impl<B: LedBar, const N: usize> BarMeter<B, N> {
    /// Default brightness of lit LEDs.
    pub const BRIGHTNESS_ON: f32 = 0.4;

    /// Default brightness of unlit LEDs.
    pub const BRIGHTNESS_OFF: f32 = 0.1;

    /// Creates a meter with the default brightness levels.
    pub fn new(bar: B) -> Self {
        Self {
            bar,
            brightness_on: Self::BRIGHTNESS_ON,
            brightness_off: Self::BRIGHTNESS_OFF,
        }
    }

    /// Overrides the lit and unlit brightness.
    pub fn with_brightness(mut self, on: f32, off: f32) -> Self {
        self.brightness_on = on;
        self.brightness_off = off;
        self
    }

    /// Color of LED `index` at `load`.
    pub fn led_color(&self, index: usize, load: f32) -> Srgb {
        let level = (index as f32 + 0.5) / N as f32;
        let value = if load >= level {
            self.brightness_on
        } else {
            self.brightness_off
        };
        hsv(bar_hue(index, N), 1.0, value)
    }

    /// Returns a reference to the LED strip.
    pub fn bar(&self) -> &B {
        &self.bar
    }
}

impl<B: LedBar, const N: usize> LoadIndicator for BarMeter<B, N> {
    fn show_load(&mut self, load: f32) {
        for index in 0..N {
            let color = self.led_color(index, load);
            self.bar.set_led(index, color);
        }
        self.bar.show();
    }
}

/// Samples supply current and trips the interlock on overcurrent.
pub struct LoadMonitor<A: CurrentSensor, L: LoadIndicator> {
    sensor: A,
    indicator: L,
    limits: LoadLimits,
}

impl<A: CurrentSensor, L: LoadIndicator> LoadMonitor<A, L> {
    /// Creates a monitor.
    pub fn new(sensor: A, indicator: L, limits: LoadLimits) -> Self {
        Self {
            sensor,
            indicator,
            limits,
        }
    }

    /// Takes one sample.
    ///
    /// Within limits the load is shown on the indicator. On overcurrent the
    /// indicator is left as it was.
    pub fn step(&mut self) -> MonitorStatus {
        let current = self.sensor.read_current();
        if current > self.limits.limit_amps {
            return MonitorStatus::Overcurrent(current);
        }

        let load = current / self.limits.rated_amps;
        self.indicator.show_load(load);
        MonitorStatus::Load(load)
    }

    /// Samples every `interval_ms` until overcurrent, then trips `interlock`.
    ///
    /// Returns the overcurrent reading, or `None` if the interlock was already
    /// tripped by someone else.
    pub fn run<D: embedded_hal::delay::DelayNs>(
        &mut self,
        interlock: &Interlock,
        delay: &mut D,
        interval_ms: u32,
    ) -> Option<f32> {
        while !interlock.is_tripped() {
            if let MonitorStatus::Overcurrent(amps) = self.step() {
                return self.trip(interlock, amps);
            }
            delay.delay_ms(interval_ms);
        }
        None
    }

    /// Cooperative variant of [`run`](Self::run).
    pub async fn run_async<D: embedded_hal_async::delay::DelayNs>(
        &mut self,
        interlock: &Interlock,
        delay: &mut D,
        interval_ms: u32,
    ) -> Option<f32> {
        while !interlock.is_tripped() {
            if let MonitorStatus::Overcurrent(amps) = self.step() {
                return self.trip(interlock, amps);
            }
            delay.delay_ms(interval_ms).await;
        }
        None
    }

    fn trip(&self, interlock: &Interlock, amps: f32) -> Option<f32> {
        if interlock.try_acquire() {
            crate::log!(warn, "overcurrent: {} A > {} A, interlock tripped", amps, self.limits.limit_amps);
            Some(amps)
        } else {
            None
        }
    }

    /// The configured limits.
    pub fn limits(&self) -> &LoadLimits {
        &self.limits
    }

    /// Returns a reference to the indicator.
    pub fn indicator(&self) -> &L {
        &self.indicator
    }
}
