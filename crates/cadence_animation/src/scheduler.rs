//! Animation scheduler
//!
//! Owns every live animation and advances them once per tick.
//! Animations are started through three entry points:
//! - [`run`](AnimationScheduler::run) - start immediately
//! - [`run_after`](AnimationScheduler::run_after) - chain behind a parent; starts once the parent finishes
//! - [`run_together`](AnimationScheduler::run_together) - join a sibling's group and run alongside it
//!
//! Chains and groups nest arbitrarily. Pause, resume, cancel and complete
//! resolve to the outermost chain/group around a handle (its *top-level
//! dependency*) when asked to, and cascade through the whole structure.
//!
//! # Bookkeeping
//!
//! Structure is kept in a handful of cross-reference tables:
//!
//! | table | meaning |
//! |---|---|
//! | `child_to_group` | member -> the group containing it |
//! | `group_to_children` | group -> ordered members (never empty) |
//! | `parent_to_group` / `group_to_parent` | handle that gates a group until it finishes |
//! | `origin_to_group` / `group_to_origin` | sibling a "run together" group was created around |
//!
//! [`validate`](AnimationScheduler::validate) checks that they agree.
//!
//! # Reentrancy
//!
//! Every wrapper callback receives `&mut AnimationScheduler` and may start,
//! pause, cancel or complete anything, including the animation being stepped.
//! `update()` steps a snapshot of the running set and re-checks each handle
//! before stepping it and after every callback.
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{wrapper, AnimationScheduler, SchedulerConfig, Timing};
//!
//! let (mut scheduler, clock) = AnimationScheduler::with_manual_clock(SchedulerConfig::standard());
//!
//! let fade = scheduler.run(
//!     (0.0f32, 1.0f32),
//!     Timing::once(0.5),
//!     wrapper::from_fn(|scheduler, handle, percent| {
//!         let (from, to) = *scheduler.payload::<(f32, f32)>(handle).unwrap();
//!         let _opacity = from + (to - from) * percent;
//!     }),
//! );
//! let slide = scheduler.run_after(fade, (), Timing::once(0.25), wrapper::from_fn(|_, _, _| {}));
//!
//! clock.advance(0.5);
//! scheduler.update(); // fade finishes, slide is released
//! assert!(scheduler.is_complete(fade));
//! assert!(scheduler.is_running(slide));
//! ```

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::config::SchedulerConfig;
use crate::error::{AnimationError, Result};
use crate::handle::{AnimationHandle, Timing};
use crate::record::{AnimationRecord, AnimationState};
use crate::wrapper::AnimationWrapper;
use cadence_core::{IdAllocator, OrderedSet, Pool, PoolStats, ValueStore};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::any::type_name;
use std::fmt;
use std::rc::Rc;

type ChildSet = OrderedSet<AnimationHandle>;
type HandleList = SmallVec<[AnimationHandle; 4]>;

/// How a forced teardown ends each animation it reaches
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Teardown {
    Cancel,
    Complete,
}

/// Handle-based scheduler for time-based animations
///
/// Single-threaded: drive it by calling [`update`](Self::update) once per frame.
pub struct AnimationScheduler {
    config: SchedulerConfig,
    clock: Rc<dyn Clock>,
    ids: IdAllocator,

    records: FxHashMap<AnimationHandle, AnimationRecord>,
    payloads: ValueStore<AnimationHandle>,
    wrappers: FxHashMap<AnimationHandle, Rc<dyn AnimationWrapper>>,
    running: OrderedSet<AnimationHandle>,

    child_to_group: FxHashMap<AnimationHandle, AnimationHandle>,
    group_to_children: FxHashMap<AnimationHandle, ChildSet>,
    parent_to_group: FxHashMap<AnimationHandle, AnimationHandle>,
    group_to_parent: FxHashMap<AnimationHandle, AnimationHandle>,
    origin_to_group: FxHashMap<AnimationHandle, AnimationHandle>,
    group_to_origin: FxHashMap<AnimationHandle, AnimationHandle>,

    set_pool: Pool<ChildSet>,
    /// Scratch copy of the running set taken at the start of each step pass
    snapshot: Vec<AnimationHandle>,
    /// Animations that fired `complete` during the current update
    completed: Vec<AnimationHandle>,
}

impl AnimationScheduler {
    /// Create a scheduler reading time from `clock`
    pub fn new(config: SchedulerConfig, clock: Rc<dyn Clock>) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "scheduler created with an invalid config");
        }

        let set_pool = if config.pool_group_sets {
            Pool::new(config.max_pooled_sets)
        } else {
            Pool::disabled()
        };

        let mut scheduler = Self {
            config,
            clock,
            ids: IdAllocator::new(),
            records: FxHashMap::default(),
            payloads: ValueStore::default(),
            wrappers: FxHashMap::default(),
            running: OrderedSet::new(),
            child_to_group: FxHashMap::default(),
            group_to_children: FxHashMap::default(),
            parent_to_group: FxHashMap::default(),
            group_to_parent: FxHashMap::default(),
            origin_to_group: FxHashMap::default(),
            group_to_origin: FxHashMap::default(),
            set_pool,
            snapshot: Vec::new(),
            completed: Vec::new(),
        };
        scheduler.init();
        scheduler
    }

    /// Create a scheduler driven by a [`ManualClock`], returning the clock as well
    pub fn with_manual_clock(config: SchedulerConfig) -> (Self, ManualClock) {
        let clock = ManualClock::new();
        let scheduler = Self::new(config, Rc::new(clock.clone()));
        (scheduler, clock)
    }

    /// Prepare tables for use
    ///
    /// Called by the constructors. Calling it again tears down everything
    /// that is live (as [`dispose`](Self::dispose) does) and re-reserves capacity.
    pub fn init(&mut self) {
        if !self.records.is_empty() || !self.group_to_children.is_empty() {
            self.dispose();
        }

        let capacity = self.config.initial_capacity;
        self.records.reserve(capacity);
        self.wrappers.reserve(capacity);
        self.running = OrderedSet::with_capacity(capacity);
        self.snapshot.reserve(capacity);
        self.set_pool
            .warm(self.config.max_pooled_sets.min(capacity / 4));

        tracing::debug!(
            capacity,
            pooled = self.set_pool.available(),
            "animation scheduler initialized"
        );
    }

    /// Drop every animation and group
    ///
    /// Each wrapper gets a final `remove` callback. No other lifecycle events fire.
    /// Dropping the scheduler does the same for whatever is still live.
    pub fn dispose(&mut self) {
        let mut wrappers: Vec<_> = self.wrappers.drain().collect();
        wrappers.sort_by_key(|(handle, _)| *handle);

        self.records.clear();
        self.payloads.clear();
        self.running.clear();
        self.child_to_group.clear();
        for (_, children) in self.group_to_children.drain() {
            self.set_pool.release(children);
        }
        self.parent_to_group.clear();
        self.group_to_parent.clear();
        self.origin_to_group.clear();
        self.group_to_origin.clear();
        self.completed.clear();

        tracing::debug!(count = wrappers.len(), "disposing animation scheduler");
        for (handle, wrapper) in wrappers {
            wrapper.remove(self, handle);
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Current time of the injected clock
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    // =========================================================================
    // Starting animations
    // =========================================================================

    /// Start an animation immediately
    pub fn run<T: 'static>(
        &mut self,
        payload: T,
        timing: Timing,
        wrapper: Rc<dyn AnimationWrapper>,
    ) -> AnimationHandle {
        let handle = self.register(payload, timing, wrapper);
        self.running.add(handle);
        tracing::trace!(%handle, ?timing, "run");
        handle
    }

    /// Start an animation once `parent` finishes
    ///
    /// If `parent` is already complete this is the same as [`run`](Self::run).
    pub fn run_after<T: 'static>(
        &mut self,
        parent: AnimationHandle,
        payload: T,
        timing: Timing,
        wrapper: Rc<dyn AnimationWrapper>,
    ) -> AnimationHandle {
        if self.is_complete(parent) {
            return self.run(payload, timing, wrapper);
        }

        let group = match self.parent_to_group.get(&parent) {
            Some(&group) => group,
            None => {
                let group = self.new_group();
                self.parent_to_group.insert(parent, group);
                self.group_to_parent.insert(group, parent);
                tracing::trace!(%parent, %group, "created chained group");
                group
            }
        };

        let handle = self.register(payload, timing, wrapper);
        self.attach(handle, group);
        if !self.is_gated(group) {
            self.running.add(handle);
        }
        tracing::trace!(%handle, %parent, ?timing, "run after");
        handle
    }

    /// Start an animation alongside `sibling`, sharing its group
    ///
    /// A group is created around `sibling` if it has none. The new animation
    /// starts immediately unless the group is still waiting on a parent.
    /// If `sibling` is already complete this is the same as [`run`](Self::run).
    pub fn run_together<T: 'static>(
        &mut self,
        sibling: AnimationHandle,
        payload: T,
        timing: Timing,
        wrapper: Rc<dyn AnimationWrapper>,
    ) -> AnimationHandle {
        if self.is_complete(sibling) {
            return self.run(payload, timing, wrapper);
        }

        let group = match self.child_to_group.get(&sibling) {
            Some(&group) => group,
            None => {
                let group = self.new_group();
                self.attach(sibling, group);
                self.origin_to_group.insert(sibling, group);
                self.group_to_origin.insert(group, sibling);
                tracing::trace!(%sibling, %group, "created sibling group");
                group
            }
        };

        let handle = self.register(payload, timing, wrapper);
        self.attach(handle, group);
        if !self.is_gated(group) {
            self.running.add(handle);
        }
        tracing::trace!(%handle, %sibling, ?timing, "run together");
        handle
    }

    /// [`run_together`](Self::run_together) with timing copied from the group
    ///
    /// Duration and iteration count come from the last member of the
    /// sibling's group, or from the sibling itself when it has no group or
    /// the last member is a nested group.
    pub fn run_together_inherit<T: 'static>(
        &mut self,
        sibling: AnimationHandle,
        payload: T,
        wrapper: Rc<dyn AnimationWrapper>,
    ) -> AnimationHandle {
        let timing = self.inherited_timing(sibling);
        self.run_together(sibling, payload, timing, wrapper)
    }

    fn inherited_timing(&self, sibling: AnimationHandle) -> Timing {
        let last_member = self
            .child_to_group
            .get(&sibling)
            .and_then(|group| self.group_to_children.get(group))
            .and_then(|children| children.last());

        last_member
            .and_then(|member| self.records.get(&member))
            .or_else(|| self.records.get(&sibling))
            .map(AnimationRecord::timing)
            .unwrap_or_else(|| {
                tracing::warn!(%sibling, "no timing to inherit, using default");
                Timing::default()
            })
    }

    fn register<T: 'static>(
        &mut self,
        payload: T,
        timing: Timing,
        wrapper: Rc<dyn AnimationWrapper>,
    ) -> AnimationHandle {
        let handle = AnimationHandle::individual(self.ids.alloc());
        let now = self.clock.now();
        self.records
            .insert(handle, AnimationRecord::new(handle, timing, now));
        self.payloads.insert(handle, payload);
        self.wrappers.insert(handle, wrapper);
        handle
    }

    fn new_group(&mut self) -> AnimationHandle {
        let group = AnimationHandle::group(self.ids.alloc());
        let children = self.set_pool.get();
        self.group_to_children.insert(group, children);
        group
    }

    fn attach(&mut self, member: AnimationHandle, group: AnimationHandle) {
        if let Some(children) = self.group_to_children.get_mut(&group) {
            children.add(member);
            self.child_to_group.insert(member, group);
        }
    }

    // =========================================================================
    // Pause / resume
    // =========================================================================

    /// Pause the whole structure `handle` belongs to
    pub fn pause(&mut self, handle: AnimationHandle) {
        let target = self.top_level_dependency(handle);
        if self.is_complete(target) {
            return;
        }

        let now = self.clock.now();
        let mut paused = HandleList::new();
        self.pause_tree(target, now, &mut paused);
        tracing::debug!(%handle, %target, count = paused.len(), "paused");

        for handle in paused {
            if let Some(wrapper) = self.wrappers.get(&handle).cloned() {
                wrapper.paused(self, handle);
            }
        }
    }

    fn pause_tree(&mut self, handle: AnimationHandle, now: f64, paused: &mut HandleList) {
        if handle.is_group() {
            for child in self.members(handle) {
                self.pause_tree(child, now, paused);
            }
            return;
        }

        let Some(record) = self.records.get_mut(&handle) else {
            tracing::error!("{}", AnimationError::MissingRecord(handle));
            return;
        };
        if record.finished || !self.running.remove(&handle) {
            return;
        }
        record.paused = true;
        record.updated_at = now;
        paused.push(handle);
    }

    /// Resume the whole structure `handle` belongs to
    ///
    /// Progress continues from where it was paused; time spent paused is not counted.
    pub fn resume(&mut self, handle: AnimationHandle) {
        let target = self.top_level_dependency(handle);
        if self.is_complete(target) {
            return;
        }

        let now = self.clock.now();
        let mut resumed = HandleList::new();
        self.resume_tree(target, now, &mut resumed);
        tracing::debug!(%handle, %target, count = resumed.len(), "resumed");

        for handle in resumed {
            if let Some(wrapper) = self.wrappers.get(&handle).cloned() {
                wrapper.resumed(self, handle);
            }
        }
    }

    fn resume_tree(&mut self, handle: AnimationHandle, now: f64, resumed: &mut HandleList) {
        if handle.is_group() {
            for child in self.members(handle) {
                self.resume_tree(child, now, resumed);
            }
            return;
        }

        match self.records.get_mut(&handle) {
            Some(record) if record.paused => {
                record.paused = false;
                record.start_time += now - record.updated_at;
                record.updated_at = now;
                self.running.add(handle);
                resumed.push(handle);
            }
            Some(_) => {}
            None => tracing::error!("{}", AnimationError::MissingRecord(handle)),
        }
    }

    // =========================================================================
    // Cancel / complete
    // =========================================================================

    /// Stop `handle` without finishing it
    ///
    /// With `cancel_dependencies`, the whole chain/group around `handle` is
    /// canceled instead. Anything chained after a canceled animation is
    /// canceled too.
    pub fn cancel(&mut self, handle: AnimationHandle, cancel_dependencies: bool) {
        let target = if cancel_dependencies {
            self.top_level_dependency(handle)
        } else {
            handle
        };
        tracing::debug!(%handle, %target, "cancel");
        self.teardown(target, Teardown::Cancel);
    }

    /// Jump `handle` to its end, firing `end` and `complete` before it is removed
    ///
    /// With `complete_dependencies`, the whole chain/group around `handle` is
    /// completed instead. Anything chained after a completed animation is
    /// completed too.
    pub fn complete(&mut self, handle: AnimationHandle, complete_dependencies: bool) {
        let target = if complete_dependencies {
            self.top_level_dependency(handle)
        } else {
            handle
        };
        tracing::debug!(%handle, %target, "complete");
        self.teardown(target, Teardown::Complete);
    }

    fn teardown(&mut self, handle: AnimationHandle, mode: Teardown) {
        if !handle.is_group() {
            self.teardown_individual(handle, mode);
            return;
        }

        // Members leave from the back, so the last one added goes first.
        // Finished members stay until cleanup.
        while let Some(child) = self.next_teardown_member(handle) {
            self.teardown(child, mode);

            let stuck = self
                .group_to_children
                .get(&handle)
                .is_some_and(|children| children.contains(&child));
            if stuck {
                tracing::error!(%handle, %child, "member survived teardown, detaching it");
                let dissolved = self.detach(child);
                self.teardown_dissolved(&dissolved, mode);
            }
        }
    }

    fn next_teardown_member(&self, group: AnimationHandle) -> Option<AnimationHandle> {
        self.group_to_children
            .get(&group)?
            .iter()
            .rev()
            .copied()
            .find(|&member| !self.is_finished(member))
    }

    fn is_finished(&self, handle: AnimationHandle) -> bool {
        self.records
            .get(&handle)
            .is_some_and(|record| record.finished)
    }

    fn teardown_individual(&mut self, handle: AnimationHandle, mode: Teardown) {
        if !self.records.contains_key(&handle) {
            if self.child_to_group.contains_key(&handle) {
                tracing::error!("{}", AnimationError::MissingRecord(handle));
                let dissolved = self.detach(handle);
                self.teardown_dissolved(&dissolved, mode);
            }
            return;
        }

        // Already fired `complete`; cleanup at the end of this update removes
        // it and releases whatever is chained behind it
        if self.is_finished(handle) {
            return;
        }

        match mode {
            Teardown::Complete => {
                let now = self.clock.now();
                if let Some(record) = self.records.get_mut(&handle) {
                    record.force_final(now);
                }
                self.step(handle, now, true);
            }
            Teardown::Cancel => {
                if let Some(wrapper) = self.wrappers.get(&handle).cloned() {
                    wrapper.canceled(self, handle);
                }
            }
        }

        // A callback may already have torn it down
        if self.records.contains_key(&handle) {
            self.discard(handle, Some(mode));
        }
    }

    fn teardown_dissolved(&mut self, dissolved: &[AnimationHandle], mode: Teardown) {
        for &group in dissolved {
            self.teardown_gated_by(group, mode);
        }
    }

    fn teardown_gated_by(&mut self, parent: AnimationHandle, mode: Teardown) {
        if let Some(group) = self.parent_to_group.remove(&parent) {
            self.group_to_parent.remove(&group);
            tracing::debug!(%parent, %group, ?mode, "cascading to chained group");
            self.teardown(group, mode);
        }
    }

    // =========================================================================
    // Removal and group maintenance
    // =========================================================================

    /// Remove an individual from every table, then cascade or release what it gated
    ///
    /// `mode` is `None` for natural completion during `update()`, in which case
    /// chained groups are released instead of torn down.
    fn discard(&mut self, handle: AnimationHandle, mode: Option<Teardown>) {
        self.records.remove(&handle);
        self.payloads.remove(handle);
        self.running.remove(&handle);
        let wrapper = self.wrappers.remove(&handle);
        let dissolved = self.detach(handle);

        if let Some(wrapper) = wrapper {
            wrapper.remove(self, handle);
        }

        match mode {
            Some(mode) => {
                self.teardown_dissolved(&dissolved, mode);
                self.teardown_gated_by(handle, mode);
            }
            None => {
                for group in dissolved {
                    self.release_gated_by(group);
                }
                self.release_gated_by(handle);
            }
        }
    }

    /// Take `member` out of its group, dissolving groups that become empty
    ///
    /// Returns the dissolved groups, innermost first.
    fn detach(&mut self, member: AnimationHandle) -> HandleList {
        let mut dissolved = HandleList::new();
        let mut current = member;

        while let Some(group) = self.child_to_group.remove(&current) {
            if self.group_to_origin.get(&group) == Some(&current) {
                self.group_to_origin.remove(&group);
                self.origin_to_group.remove(&current);
            }

            let now_empty = match self.group_to_children.get_mut(&group) {
                Some(children) => {
                    children.remove(&current);
                    children.is_empty()
                }
                None => {
                    tracing::error!(%current, %group, "member of a group with no child list");
                    false
                }
            };
            if !now_empty {
                break;
            }

            self.dissolve(group);
            dissolved.push(group);
            current = group;
        }

        dissolved
    }

    fn dissolve(&mut self, group: AnimationHandle) {
        if let Some(children) = self.group_to_children.remove(&group) {
            self.set_pool.release(children);
        }
        if let Some(parent) = self.group_to_parent.remove(&group) {
            self.parent_to_group.remove(&parent);
        }
        if let Some(origin) = self.group_to_origin.remove(&group) {
            self.origin_to_group.remove(&origin);
        }
        tracing::trace!(%group, "dissolved group");
    }

    /// Let the group chained behind `parent` start running
    fn release_gated_by(&mut self, parent: AnimationHandle) {
        let Some(group) = self.parent_to_group.remove(&parent) else {
            return;
        };
        self.group_to_parent.remove(&group);

        let now = self.clock.now();
        tracing::debug!(%parent, %group, "releasing chained group");
        self.activate(group, now);
    }

    fn activate(&mut self, group: AnimationHandle, now: f64) {
        for child in self.members(group) {
            if child.is_group() {
                // Nested groups with their own parent keep waiting for it
                if !self.group_to_parent.contains_key(&child) {
                    self.activate(child, now);
                }
                continue;
            }

            match self.records.get_mut(&child) {
                Some(record) => {
                    if record.paused || record.finished {
                        continue;
                    }
                    record.start_time = now;
                    record.updated_at = now;
                    self.running.add(child);
                }
                None => tracing::error!("{}", AnimationError::MissingRecord(child)),
            }
        }
    }

    /// Whether `group` (or a group enclosing it) is still waiting on a parent
    fn is_gated(&self, group: AnimationHandle) -> bool {
        let mut current = group;
        for _ in 0..=self.child_to_group.len() {
            if self.group_to_parent.contains_key(&current) {
                return true;
            }
            match self.child_to_group.get(&current) {
                Some(&outer) => current = outer,
                None => return false,
            }
        }
        tracing::error!(%group, "group nesting cycle");
        false
    }

    fn members(&self, group: AnimationHandle) -> HandleList {
        self.group_to_children
            .get(&group)
            .map(|children| children.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Outermost chain or group that `handle` belongs to
    ///
    /// Follows group membership, then the parent gating a group, then the
    /// group created around an origin sibling, until none applies. Returns
    /// `handle` itself when it is not part of any structure.
    pub fn top_level_dependency(&self, handle: AnimationHandle) -> AnimationHandle {
        let limit = self.child_to_group.len()
            + self.group_to_parent.len()
            + self.origin_to_group.len();
        let mut current = handle;

        for _ in 0..=limit {
            let next = self
                .child_to_group
                .get(&current)
                .or_else(|| self.group_to_parent.get(&current))
                .or_else(|| self.origin_to_group.get(&current));

            match next {
                Some(&next) => current = next,
                None => return current,
            }
        }

        tracing::error!(%handle, "dependency cycle while resolving top-level dependency");
        current
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance every running animation to the clock's current time
    ///
    /// Steps a snapshot of the running set, then removes animations that
    /// completed and releases whatever was chained behind them.
    pub fn update(&mut self) {
        let now = self.clock.now();

        let mut snapshot = std::mem::take(&mut self.snapshot);
        snapshot.clear();
        snapshot.extend(self.running.iter().copied());

        for &handle in &snapshot {
            // Removed or paused by a callback earlier in this pass
            if !self.running.contains(&handle) {
                continue;
            }
            if self.step(handle, now, false) {
                self.completed.push(handle);
            }
        }

        snapshot.clear();
        self.snapshot = snapshot;

        let mut completed = std::mem::take(&mut self.completed);
        for handle in completed.drain(..) {
            if self.records.contains_key(&handle) {
                tracing::trace!(%handle, "cleaning up completed animation");
                self.discard(handle, None);
            }
        }
        if self.completed.is_empty() {
            self.completed = completed;
        }
    }

    /// Step one animation; returns `true` when it fired `complete` and is still alive
    ///
    /// `forced` steps come from `complete()` and run even when the animation is
    /// paused or pending. Otherwise stepping stops as soon as a callback pauses
    /// the animation or takes it out of the running set.
    fn step(&mut self, handle: AnimationHandle, now: f64, forced: bool) -> bool {
        let epsilon = self.config.snap_epsilon;
        let Some(record) = self.records.get_mut(&handle) else {
            return false;
        };
        if record.finished {
            return false;
        }

        record.updated_at = now;
        let percent = record.percent_done(now, epsilon);
        let first_step = !record.started;
        record.started = true;
        let iteration = record.current_iteration;

        let Some(wrapper) = self.wrappers.get(&handle).cloned() else {
            tracing::error!(
                "{}",
                AnimationError::Invariant(format!("{handle} has a record but no wrapper"))
            );
            return false;
        };

        if first_step {
            wrapper.start(self, handle, iteration);
            if !self.still_stepping(handle, forced) {
                return false;
            }
        }

        tracing::trace!(%handle, percent, iteration, "step");
        wrapper.update_animation(self, handle, percent);
        if percent < 1.0 || !self.still_stepping(handle, forced) {
            return false;
        }

        wrapper.end(self, handle);
        let stepping = self.still_stepping(handle, forced);
        let Some(record) = self.records.get_mut(&handle) else {
            return false;
        };

        if record.is_last_iteration() {
            // Paused in `end`: stays at 100% and finishes after resume
            if !stepping {
                return false;
            }
            record.finished = true;
            wrapper.complete(self, handle);
            self.records.contains_key(&handle)
        } else {
            record.advance_iteration(now);
            false
        }
    }

    fn still_stepping(&self, handle: AnimationHandle, forced: bool) -> bool {
        if forced {
            self.records.contains_key(&handle)
        } else {
            self.running.contains(&handle)
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `true` once `handle` has no live record (individual) or child list (group)
    ///
    /// Unknown and stale handles are complete.
    pub fn is_complete(&self, handle: AnimationHandle) -> bool {
        if handle.is_group() {
            !self.group_to_children.contains_key(&handle)
        } else {
            !self.records.contains_key(&handle)
        }
    }

    /// Whether `handle` will be stepped on the next update
    pub fn is_running(&self, handle: AnimationHandle) -> bool {
        self.running.contains(&handle)
    }

    pub fn is_paused(&self, handle: AnimationHandle) -> bool {
        self.records.get(&handle).is_some_and(|record| record.paused)
    }

    pub fn state(&self, handle: AnimationHandle) -> Option<AnimationState> {
        let record = self.records.get(&handle)?;
        let state = if record.finished {
            AnimationState::Finished
        } else if record.paused {
            AnimationState::Paused
        } else if !self.running.contains(&handle) {
            AnimationState::Pending
        } else if record.started {
            AnimationState::Running
        } else {
            AnimationState::NotStarted
        };
        Some(state)
    }

    /// Progress of the current iteration in `[0, 1]`
    ///
    /// Pending animations report 0; paused ones report where they stopped.
    pub fn progress(&self, handle: AnimationHandle) -> Option<f32> {
        let record = self.records.get(&handle)?;
        let epsilon = self.config.snap_epsilon;
        let progress = match self.state(handle)? {
            AnimationState::Pending => 0.0,
            AnimationState::Finished => 1.0,
            AnimationState::Paused => record.percent_done(record.updated_at, epsilon),
            AnimationState::NotStarted | AnimationState::Running => {
                record.percent_done(self.clock.now(), epsilon)
            }
        };
        Some(progress)
    }

    /// Timing `handle` was scheduled with
    pub fn timing(&self, handle: AnimationHandle) -> Option<Timing> {
        self.records.get(&handle).map(AnimationRecord::timing)
    }

    /// Zero-based iteration currently playing
    pub fn current_iteration(&self, handle: AnimationHandle) -> Option<u32> {
        self.records.get(&handle).map(|record| record.current_iteration)
    }

    /// Group `handle` is a member of
    pub fn group_of(&self, handle: AnimationHandle) -> Option<AnimationHandle> {
        self.child_to_group.get(&handle).copied()
    }

    /// Members of `group` in their current order
    pub fn children(&self, group: AnimationHandle) -> Vec<AnimationHandle> {
        self.group_to_children
            .get(&group)
            .map(|children| children.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Group waiting for `parent` to finish
    pub fn chained_group(&self, parent: AnimationHandle) -> Option<AnimationHandle> {
        self.parent_to_group.get(&parent).copied()
    }

    /// Handle that `group` is waiting on
    pub fn gating_parent(&self, group: AnimationHandle) -> Option<AnimationHandle> {
        self.group_to_parent.get(&group).copied()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    // =========================================================================
    // Payloads
    // =========================================================================

    pub fn payload<T: 'static>(&self, handle: AnimationHandle) -> Option<&T> {
        self.payloads.get(handle)
    }

    pub fn payload_mut<T: 'static>(&mut self, handle: AnimationHandle) -> Option<&mut T> {
        self.payloads.get_mut(handle)
    }

    /// Replace the payload of a live animation; returns `false` if `handle` is gone
    pub fn set_payload<T: 'static>(&mut self, handle: AnimationHandle, value: T) -> bool {
        self.payloads.set(handle, value)
    }

    /// Like [`payload`](Self::payload), but says why the payload is unavailable
    pub fn try_payload<T: 'static>(&self, handle: AnimationHandle) -> Result<&T> {
        let found = self
            .payloads
            .type_name_of(handle)
            .ok_or(AnimationError::UnknownHandle(handle))?;
        self.payloads
            .get::<T>(handle)
            .ok_or(AnimationError::PayloadType {
                handle,
                expected: type_name::<T>(),
                found,
            })
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            animation_count: self.records.len(),
            running_count: self.running.len(),
            paused_count: self.records.values().filter(|r| r.paused).count(),
            group_count: self.group_to_children.len(),
            chained_group_count: self.group_to_parent.len(),
            pool: self.set_pool.stats(),
        }
    }

    /// Check that every cross-reference table agrees with the others
    pub fn validate(&self) -> Result<()> {
        fn violation<T>(message: String) -> Result<T> {
            Err(AnimationError::Invariant(message))
        }

        for (handle, record) in &self.records {
            if handle.is_group() || record.handle != *handle {
                return violation(format!("record table holds {handle} as {}", record.handle));
            }
            if !self.payloads.contains(*handle) {
                return violation(format!("{handle} has no payload"));
            }
            if !self.wrappers.contains_key(handle) {
                return violation(format!("{handle} has no wrapper"));
            }
            if record.paused && self.running.contains(handle) {
                return violation(format!("{handle} is paused but still running"));
            }
        }
        if self.payloads.len() != self.records.len() || self.wrappers.len() != self.records.len()
        {
            return violation(format!(
                "{} records, {} payloads, {} wrappers",
                self.records.len(),
                self.payloads.len(),
                self.wrappers.len()
            ));
        }

        for handle in &self.running {
            if !self.records.contains_key(handle) {
                return violation(format!("running set holds {handle} without a record"));
            }
            if let Some(&group) = self.child_to_group.get(handle) {
                if self.is_gated(group) {
                    return violation(format!("{handle} runs inside gated {group}"));
                }
            }
        }

        for (member, group) in &self.child_to_group {
            let listed = self
                .group_to_children
                .get(group)
                .is_some_and(|children| children.contains(member));
            if !listed {
                return violation(format!("{member} points at {group} which does not list it"));
            }
        }

        for (group, children) in &self.group_to_children {
            if !group.is_group() {
                return violation(format!("{group} has a child list but is not a group"));
            }
            if children.is_empty() {
                return violation(format!("{group} is empty"));
            }
            for member in children {
                if self.child_to_group.get(member) != Some(group) {
                    return violation(format!("{group} lists {member} which points elsewhere"));
                }
                if self.is_complete(*member) {
                    return violation(format!("{group} lists finished {member}"));
                }
            }
        }

        for (parent, group) in &self.parent_to_group {
            if self.group_to_parent.get(group) != Some(parent) {
                return violation(format!("{parent} gates {group} without a back link"));
            }
            if self.is_complete(*parent) || self.is_complete(*group) {
                return violation(format!("chain link {parent} -> {group} is stale"));
            }
        }
        if self.parent_to_group.len() != self.group_to_parent.len() {
            return violation("parent links are not bijective".to_string());
        }

        for (origin, group) in &self.origin_to_group {
            if self.group_to_origin.get(group) != Some(origin) {
                return violation(format!("{origin} is origin of {group} without a back link"));
            }
            if self.child_to_group.get(origin) != Some(group) {
                return violation(format!("origin {origin} is not a member of {group}"));
            }
        }
        if self.origin_to_group.len() != self.group_to_origin.len() {
            return violation("origin links are not bijective".to_string());
        }

        Ok(())
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default(), Rc::new(SystemClock::new()))
    }
}

impl Drop for AnimationScheduler {
    fn drop(&mut self) {
        if !self.wrappers.is_empty() {
            self.dispose();
        }
    }
}

impl fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Counts describing the scheduler's current load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub animation_count: usize,
    pub running_count: usize,
    pub paused_count: usize,
    pub group_count: usize,
    pub chained_group_count: usize,
    pub pool: PoolStats,
}
