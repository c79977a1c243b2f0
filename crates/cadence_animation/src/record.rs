//! Per-animation timing state

use crate::handle::{AnimationHandle, Timing};

/// Observable lifecycle state of an individual animation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// Waiting in a group gated behind a parent that has not finished
    Pending,
    /// Eligible to run; the current iteration has not been stepped yet
    NotStarted,
    Running,
    Paused,
    /// Fired `complete`; removed at the end of the current update
    Finished,
}

/// Timing bookkeeping for one individual animation
#[derive(Clone, Debug)]
pub(crate) struct AnimationRecord {
    pub handle: AnimationHandle,
    /// When the current iteration became eligible to run
    pub start_time: f64,
    /// False until the current iteration fires `start`
    pub started: bool,
    /// Last step time, or the pause time while paused
    pub updated_at: f64,
    pub duration: f64,
    /// Iteration count the animation was scheduled with
    pub iterations: i32,
    /// 1 = last iteration, >1 = that many left, <=0 = infinite
    pub remaining_iterations: i32,
    pub current_iteration: u32,
    pub paused: bool,
    pub finished: bool,
}

impl AnimationRecord {
    pub fn new(handle: AnimationHandle, timing: Timing, now: f64) -> Self {
        Self {
            handle,
            start_time: now,
            started: false,
            updated_at: now,
            duration: timing.duration,
            iterations: timing.iterations,
            remaining_iterations: timing.iterations,
            current_iteration: 0,
            paused: false,
            finished: false,
        }
    }

    /// Timing as originally scheduled
    pub fn timing(&self) -> Timing {
        Timing::new(self.duration, self.iterations)
    }

    /// Progress of the current iteration at `now`, clamped to `[0, 1]`
    ///
    /// Values within `epsilon` of either end snap to exactly 0 or 1.
    pub fn percent_done(&self, now: f64, epsilon: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let raw = ((now - self.start_time) / self.duration).clamp(0.0, 1.0) as f32;
        if raw <= epsilon {
            0.0
        } else if raw >= 1.0 - epsilon {
            1.0
        } else {
            raw
        }
    }

    /// Begin the next iteration after the current one reached 100%
    pub fn advance_iteration(&mut self, now: f64) {
        if self.remaining_iterations > 1 {
            self.remaining_iterations -= 1;
        }
        self.current_iteration += 1;
        self.started = false;
        self.start_time = now;
    }

    /// Move `start_time` so that progress evaluates to exactly 1 at `now`
    pub fn force_final(&mut self, now: f64) {
        self.remaining_iterations = 1;
        self.start_time = now - self.duration.max(0.0);
    }

    pub fn is_last_iteration(&self) -> bool {
        self.remaining_iterations == 1
    }
}
