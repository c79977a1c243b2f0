//! Animation handles and timing parameters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an individual animation or a group of animations
///
/// Ids are allocated monotonically and never reused, so once an animation
/// finishes its handle reads as complete forever.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnimationHandle {
    id: u64,
    is_group: bool,
}

impl AnimationHandle {
    pub(crate) fn individual(id: u64) -> Self {
        Self {
            id,
            is_group: false,
        }
    }

    pub(crate) fn group(id: u64) -> Self {
        Self { id, is_group: true }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_group(&self) -> bool {
        self.is_group
    }
}

impl fmt::Display for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_group {
            write!(f, "group#{}", self.id)
        } else {
            write!(f, "anim#{}", self.id)
        }
    }
}

/// Duration and repeat count of an individual animation
///
/// `iterations == 1` plays once, `> 1` plays that many times, and `<= 0`
/// loops until canceled or completed.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    /// Length of one iteration in seconds
    pub duration: f64,
    pub iterations: i32,
}

impl Timing {
    pub fn new(duration: f64, iterations: i32) -> Self {
        Self {
            duration,
            iterations,
        }
    }

    /// Play once
    pub fn once(duration: f64) -> Self {
        Self::new(duration, 1)
    }

    /// Play `count` times
    pub fn repeat(duration: f64, count: i32) -> Self {
        Self::new(duration, count)
    }

    /// Loop until stopped
    pub fn forever(duration: f64) -> Self {
        Self::new(duration, 0)
    }

    pub fn is_infinite(&self) -> bool {
        self.iterations <= 0
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::once(0.0)
    }
}
