//! Cadence Animation Scheduler
//!
//! Handle-based scheduling of time-based animations with sequencing,
//! grouping, and cascading control.
//!
//! # Features
//!
//! - **Handles**: every animation and group is addressed by a small `Copy` handle; stale handles are harmless
//! - **Chains**: `run_after` holds an animation back until its parent finishes
//! - **Groups**: `run_together` runs animations side by side and treats them as one unit
//! - **Cascading Control**: pause, resume, cancel, and complete reach the whole chain/group
//! - **Reentrant Callbacks**: wrappers receive the scheduler and may schedule or stop anything
//! - **Injected Clocks**: drive time from the wall clock or a [`ManualClock`] in tests
//!
//! The scheduler is single-threaded and engine-agnostic: it decides *when*
//! progress changes and hands `[0, 1]` values to caller-supplied
//! [`AnimationWrapper`]s, which apply them to whatever they animate.

pub mod clock;
pub mod config;
pub mod error;
pub mod handle;
mod record;
pub mod scheduler;
pub mod wrapper;


pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SchedulerConfig;
pub use error::{AnimationError, Result};
pub use handle::{AnimationHandle, Timing};
pub use record::AnimationState;
pub use scheduler::{AnimationScheduler, SchedulerStats};
pub use wrapper::{AnimationWrapper, NoopWrapper};
