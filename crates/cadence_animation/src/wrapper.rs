//! Caller-implemented animation callbacks
//!
//! A wrapper turns progress into a visible change (moving a node, fading a
//! color). The scheduler only decides *when* to call it. Every callback gets
//! the scheduler itself so it can start, pause, cancel or complete other
//! animations (including the one being stepped) without any global state.

use crate::handle::AnimationHandle;
use crate::scheduler::AnimationScheduler;
use std::rc::Rc;

/// Callbacks invoked for one individual animation
///
/// Only [`update_animation`](AnimationWrapper::update_animation) is required.
/// The lifecycle notifications default to no-ops; override the ones you need.
///
/// Callbacks take `&self`: the scheduler may re-enter the same wrapper (for
/// example a `complete` handler that cancels its own handle triggers
/// `canceled`), so use interior mutability for state.
pub trait AnimationWrapper {
    /// Apply progress in `[0, 1]` for the current iteration
    fn update_animation(
        &self,
        scheduler: &mut AnimationScheduler,
        handle: AnimationHandle,
        percent_done: f32,
    );

    /// The scheduler dropped its reference to this wrapper
    fn remove(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle) {}

    /// An iteration is about to receive its first update
    fn start(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle, _iteration: u32) {
    }

    /// An iteration reached 100%
    fn end(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle) {}

    /// The final iteration finished
    fn complete(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle) {}

    fn paused(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle) {}

    fn resumed(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle) {}

    /// Torn down before finishing
    fn canceled(&self, _scheduler: &mut AnimationScheduler, _handle: AnimationHandle) {}
}

impl<F> AnimationWrapper for F
where
    F: Fn(&mut AnimationScheduler, AnimationHandle, f32),
{
    fn update_animation(
        &self,
        scheduler: &mut AnimationScheduler,
        handle: AnimationHandle,
        percent_done: f32,
    ) {
        self(scheduler, handle, percent_done)
    }
}

/// Box a closure as a wrapper that only handles `update_animation`
///
/// Gives the closure a concrete signature so its arguments need no annotations.
pub fn from_fn<F>(f: F) -> Rc<dyn AnimationWrapper>
where
    F: Fn(&mut AnimationScheduler, AnimationHandle, f32) + 'static,
{
    Rc::new(f)
}

/// Wrapper that ignores every callback
///
/// Useful for pure timing nodes such as delays in a chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWrapper;

impl AnimationWrapper for NoopWrapper {
    fn update_animation(&self, _: &mut AnimationScheduler, _: AnimationHandle, _: f32) {}
}
