//! Type-erased value storage
//!
//! A [`ValueStore`] holds values of arbitrary types behind a single key space.
//! Each value is stored as a `Box<dyn Any>`, so code that only needs to drop
//! or test for a value (for example when an animation is torn down) can do so
//! by key alone, while callers that know the concrete type get strongly-typed
//! access through the generic accessors.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::ValueStore;
//!
//! #[derive(Debug, PartialEq)]
//! struct Fade { from: f32, to: f32 }
//!
//! let mut store = ValueStore::new();
//! let fade = store.add(Fade { from: 0.0, to: 1.0 });
//! let label = store.add("title");
//!
//! assert_eq!(store.get::<Fade>(fade), Some(&Fade { from: 0.0, to: 1.0 }));
//! // Wrong type reads as absent
//! assert_eq!(store.get::<Fade>(label), None);
//!
//! // Removal does not need to know the type
//! assert!(store.remove(fade));
//! assert!(!store.contains(fade));
//! ```

use crate::ids::IdAllocator;
use rustc_hash::FxHashMap;
use std::any::{type_name, Any};
use std::hash::Hash;

/// Key handed out by [`ValueStore::add`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueKey(pub u64);

struct Slot {
    value: Box<dyn Any>,
    type_name: &'static str,
}

/// Heterogeneous store keyed by `K`
///
/// `K` defaults to [`ValueKey`], for which the store allocates keys itself.
/// Owners that already have their own identifiers (such as animation handles)
/// use [`insert`](ValueStore::insert) with their own key type instead.
pub struct ValueStore<K = ValueKey> {
    values: FxHashMap<K, Slot>,
    ids: IdAllocator,
}

impl ValueStore<ValueKey> {
    /// Create a store that allocates its own keys
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under a freshly allocated key
    pub fn add<T: 'static>(&mut self, value: T) -> ValueKey {
        let key = ValueKey(self.ids.alloc());
        self.insert(key, value);
        key
    }
}

impl<K: Copy + Eq + Hash> ValueStore<K> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut store = Self::default();
        store.values.reserve(capacity);
        store
    }

    /// Store `value` under `key`, replacing whatever was there (of any type)
    pub fn insert<T: 'static>(&mut self, key: K, value: T) {
        self.values.insert(
            key,
            Slot {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
    }

    /// Borrow the value under `key` if it exists and has type `T`
    pub fn get<T: 'static>(&self, key: K) -> Option<&T> {
        self.values
            .get(&key)
            .and_then(|slot| slot.value.downcast_ref::<T>())
    }

    /// Mutably borrow the value under `key` if it exists and has type `T`
    pub fn get_mut<T: 'static>(&mut self, key: K) -> Option<&mut T> {
        self.values
            .get_mut(&key)
            .and_then(|slot| slot.value.downcast_mut::<T>())
    }

    /// Replace an existing value; returns `false` if `key` is absent
    ///
    /// The new value may have a different type than the old one.
    pub fn set<T: 'static>(&mut self, key: K, value: T) -> bool {
        match self.values.get_mut(&key) {
            Some(slot) => {
                slot.value = Box::new(value);
                slot.type_name = type_name::<T>();
                true
            }
            None => false,
        }
    }

    /// Remove and return the value under `key` if it has type `T`
    ///
    /// A value of a different type is left in place.
    pub fn take<T: 'static>(&mut self, key: K) -> Option<T> {
        if !self.values.get(&key)?.value.is::<T>() {
            return None;
        }
        let slot = self.values.remove(&key)?;
        slot.value.downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Drop the value under `key` regardless of its type
    pub fn remove(&mut self, key: K) -> bool {
        self.values.remove(&key).is_some()
    }

    pub fn contains(&self, key: K) -> bool {
        self.values.contains_key(&key)
    }

    /// Name of the concrete type stored under `key`, for diagnostics
    pub fn type_name_of(&self, key: K) -> Option<&'static str> {
        self.values.get(&key).map(|slot| slot.type_name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.values.keys().copied()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl<K: Copy + Eq + Hash> Default for ValueStore<K> {
    fn default() -> Self {
        Self {
            values: FxHashMap::default(),
            ids: IdAllocator::new(),
        }
    }
}

impl<K: std::fmt::Debug> std::fmt::Debug for ValueStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(k, slot)| (k, slot.type_name)))
            .finish()
    }
}
