//! Insertion-ordered set with constant-time removal
//!
//! Elements live in a dense `Vec` with a side index table, so membership
//! tests, index lookups and removals are all O(1). Removal swaps the last
//! element into the vacated slot, which means removal does not preserve the
//! relative order of the element that was moved.

use rustc_hash::FxHashMap;
use std::hash::Hash;

/// Duplicate-free collection supporting O(1) `contains`, `remove` and positional access
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    items: Vec<T>,
    index: FxHashMap<T, usize>,
}

impl<T: Copy + Eq + Hash> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut index = FxHashMap::default();
        index.reserve(capacity);
        Self {
            items: Vec::with_capacity(capacity),
            index,
        }
    }

    /// Append `value` unless it is already present
    ///
    /// Returns `true` if the value was inserted.
    pub fn add(&mut self, value: T) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        self.index.insert(value, self.items.len());
        self.items.push(value);
        true
    }

    /// Remove `value` by swapping the last element into its slot
    ///
    /// Returns `false` if the value was not present.
    pub fn remove(&mut self, value: &T) -> bool {
        let Some(slot) = self.index.remove(value) else {
            return false;
        };
        self.items.swap_remove(slot);
        if let Some(moved) = self.items.get(slot) {
            self.index.insert(*moved, slot);
        }
        true
    }

    /// Remove and return the last element
    pub fn pop(&mut self) -> Option<T> {
        let value = self.items.pop()?;
        self.index.remove(&value);
        Some(value)
    }

    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.index.contains_key(value)
    }

    #[inline]
    pub fn index_of(&self, value: &T) -> Option<usize> {
        self.index.get(value).copied()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        self.items.get(index).copied()
    }

    #[inline]
    pub fn first(&self) -> Option<T> {
        self.items.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<T> {
        self.items.last().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Remove every element, keeping allocated capacity
    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }
}

impl<T: Copy + Eq + Hash> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Copy + Eq + Hash> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Copy + Eq + Hash> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}

impl<T: Copy + Eq + Hash> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}
