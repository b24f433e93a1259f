//! Color space conversion helpers.
//!
//! Frame indicator colors and the load bar are expressed in HSV, which maps
//! naturally onto "green when idle, red when loaded". All functions return
//! `palette::Srgb` so they can be handed straight to a driver.

use palette::{FromColor, Hsv, Srgb};

/// Hue of green, in degrees.
pub const HUE_GREEN: f32 = 120.0;

/// Creates an RGB color from HSV (Hue, Saturation, Value) components.
///
/// `hue` is in degrees.
#[inline]
pub fn hsv(hue: f32, saturation: f32, value: f32) -> Srgb {
    let hsv = Hsv::new(hue, saturation, value);
    Srgb::from_color(hsv)
}

/// Creates an RGB color from hue only (full saturation and value).
#[inline]
pub fn hue(hue: f32) -> Srgb {
    hsv(hue, 1.0, 1.0)
}

/// Hue of LED `index` on a bar of `count` LEDs.
///
/// Runs from green at the first LED to red at the last.
#[inline]
pub fn bar_hue(index: usize, count: usize) -> f32 {
    if count <= 1 {
        return HUE_GREEN;
    }
    (1.0 - index as f32 / (count - 1) as f32) * HUE_GREEN
}
