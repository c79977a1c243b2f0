//! Recycling pool for short-lived collections
//!
//! A [`Pool`] keeps a free list of cleared values so that hot paths which
//! repeatedly create and discard collections (for example a group's child
//! list) can reuse the backing allocation. Pooling is purely an allocation
//! optimization: a disabled pool hands out fresh values and behaves
//! identically otherwise.

use crate::ordered_set::OrderedSet;
use std::hash::Hash;

/// Values that can be reset to an empty state before reuse
pub trait Recycle {
    fn recycle(&mut self);
}

impl<T: Copy + Eq + Hash> Recycle for OrderedSet<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}

impl<T> Recycle for Vec<T> {
    fn recycle(&mut self) {
        self.clear();
    }
}

/// Free list of recycled values
#[derive(Debug)]
pub struct Pool<C> {
    free: Vec<C>,
    max_retained: usize,
    enabled: bool,
    created: usize,
    reused: usize,
}

impl<C: Recycle + Default> Pool<C> {
    /// Create a pool that retains up to `max_retained` released values
    pub fn new(max_retained: usize) -> Self {
        Self {
            free: Vec::new(),
            max_retained,
            enabled: true,
            created: 0,
            reused: 0,
        }
    }

    /// A pool that never retains anything; every `get` allocates
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0)
        }
    }

    /// Take a recycled value, or construct a new one if the free list is empty
    pub fn get(&mut self) -> C {
        match self.free.pop() {
            Some(value) => {
                self.reused += 1;
                value
            }
            None => {
                self.created += 1;
                C::default()
            }
        }
    }

    /// Clear `value` and keep it for a later `get`
    pub fn release(&mut self, mut value: C) {
        if !self.enabled || self.free.len() >= self.max_retained {
            tracing::trace!("pool full or disabled, dropping released value");
            return;
        }
        value.recycle();
        self.free.push(value);
    }

    /// Pre-populate the free list with `count` values
    pub fn warm(&mut self, count: usize) {
        if !self.enabled {
            return;
        }
        let target = count.min(self.max_retained);
        while self.free.len() < target {
            self.free.push(C::default());
        }
    }

    /// Number of values waiting on the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Drop every retained value
    pub fn clear(&mut self) {
        self.free.clear();
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            available: self.free.len(),
            created: self.created,
            reused: self.reused,
        }
    }
}

/// Counters describing pool effectiveness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub available: usize,
    pub created: usize,
    pub reused: usize,
}
