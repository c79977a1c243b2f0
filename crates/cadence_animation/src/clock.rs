//! Time sources
//!
//! The scheduler does not own a clock; it reads "now" from an injected
//! [`Clock`] once per `update()` and whenever an operation needs to stamp a
//! record (pause, resume, chain release).

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Monotonic, non-decreasing time source in seconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Wall clock measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven clock, shared between the driver and the scheduler
///
/// Clones observe the same time, so a test or game loop can keep one clone
/// and hand another to the scheduler.
///
/// ```rust
/// use cadence_animation::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let shared = clock.clone();
/// clock.advance(0.25);
/// assert_eq!(shared.now(), 0.25);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `time`. Moving backwards is ignored.
    pub fn set(&self, time: f64) {
        if time >= self.time.get() {
            self.time.set(time);
        } else {
            tracing::warn!(
                current = self.time.get(),
                requested = time,
                "ignoring attempt to move manual clock backwards"
            );
        }
    }

    /// Move forward by `dt` seconds
    pub fn advance(&self, dt: f64) {
        self.set(self.time.get() + dt.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}
