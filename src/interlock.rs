//! One-shot safety latch shared with the load monitor.

use core::sync::atomic::{AtomicBool, Ordering};

/// A latch that halts motion once tripped.
///
/// The load monitor owns the latch and trips it when it detects a fault. The
/// scheduler only observes it, before each frame and before each lockstep
/// iteration. Nothing in the motion path ever clears it; a tripped interlock
/// stays tripped until the owner calls [`release`](Self::release) at
/// shutdown.
///
/// This is the only state shared between the two tasks. It is a plain atomic,
/// so it can live in a `static` and be shared between threads or between
/// tasks of a cooperative executor alike.
#[derive(Debug)]
pub struct Interlock {
    tripped: AtomicBool,
}

impl Interlock {
    /// Creates an untripped interlock.
    pub const fn new() -> Self {
        Self {
            tripped: AtomicBool::new(false),
        }
    }

    /// Tries to claim the latch without blocking.
    ///
    /// Returns `true` if this call tripped it and `false` if it was already
    /// tripped. Either way the latch is tripped afterwards.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        self.tripped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Trips the latch.
    #[inline]
    pub fn trip(&self) {
        self.tripped.store(true, Ordering::Release);
    }

    /// Returns true once the latch has been tripped.
    #[inline]
    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::Acquire)
    }

    /// Clears the latch.
    ///
    /// Reserved for the owning monitor at shutdown or re-arm after a full
    /// power cycle of the actuators.
    #[inline]
    pub fn release(&self) {
        self.tripped.store(false, Ordering::Release);
    }
}

impl Default for Interlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_interlock_is_clear() {
        let interlock = Interlock::new();
        assert!(!interlock.is_tripped());
    }

    #[test]
    fn first_acquire_wins() {
        let interlock = Interlock::new();
        assert!(interlock.try_acquire());
        assert!(!interlock.try_acquire());
        assert!(interlock.is_tripped());
    }

    #[test]
    fn trip_latches() {
        let interlock = Interlock::new();
        interlock.trip();
        interlock.trip();
        assert!(interlock.is_tripped());
        assert!(!interlock.try_acquire());
    }

    #[test]
    fn release_rearms() {
        static INTERLOCK: Interlock = Interlock::new();
        INTERLOCK.trip();
        INTERLOCK.release();
        assert!(!INTERLOCK.is_tripped());
        assert!(INTERLOCK.try_acquire());
    }
}
