//! Easing curves mapping normalized time to normalized progress.

/// How a transition progresses from its start to its end position.
///
/// Every curve maps `t` in `[0.0, 1.0]` to a progress fraction. Curves are
/// total: inputs outside that range never panic, although the returned value
/// is unspecified. Callers clamp at the boundary instead (see
/// [`Transition::ease`](crate::Transition::ease)).
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    /// Constant speed: `f(t) = t`.
    #[default]
    Linear,

    /// Quadratic ease-in: slow start, accelerating toward end. `f(t) = t²`.
    EaseInQuadratic,

    /// Quadratic ease-out: fast start, decelerating toward end.
    EaseOutQuadratic,

    /// Quadratic ease-in-out: slow start and end, fast middle.
    EaseInOutQuadratic,

    /// User-supplied curve.
    ///
    /// May overshoot `[0.0, 1.0]`; the overshoot is passed through to the
    /// position until the transition's duration has elapsed.
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// Applies the curve to normalized time `t`.
    #[inline]
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseInQuadratic => t * t,
            Easing::EaseOutQuadratic => t * (2.0 - t),
            Easing::EaseInOutQuadratic => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::Custom(curve) => curve(t),
        }
    }

    /// Returns true if the curve never decreases on `[0.0, 1.0]`.
    ///
    /// Custom curves are assumed to be arbitrary.
    pub fn is_monotonic(&self) -> bool {
        !matches!(self, Easing::Custom(_))
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Easing {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Easing::Linear => defmt::write!(f, "Linear"),
            Easing::EaseInQuadratic => defmt::write!(f, "EaseInQuadratic"),
            Easing::EaseOutQuadratic => defmt::write!(f, "EaseOutQuadratic"),
            Easing::EaseInOutQuadratic => defmt::write!(f, "EaseInOutQuadratic"),
            Easing::Custom(_) => defmt::write!(f, "Custom"),
        }
    }
}
