//! Cadence Core
//!
//! Engine-agnostic building blocks used by the Cadence animation scheduler:
//!
//! - **Ordered Sets**: insertion-ordered, duplicate-free sets with O(1) membership and removal
//! - **Pools**: free lists that recycle cleared collections instead of reallocating them
//! - **Value Stores**: type-erased storage so payloads of any type can live behind a single key space
//! - **Id Allocation**: monotonic, never-reused identifiers
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{OrderedSet, ValueStore};
//!
//! let mut running = OrderedSet::new();
//! running.add(3u64);
//! running.add(7u64);
//! assert!(running.contains(&7));
//!
//! let mut store = ValueStore::new();
//! let key = store.add(String::from("fade"));
//! assert_eq!(store.get::<String>(key).map(String::as_str), Some("fade"));
//! ```

pub mod ids;
pub mod ordered_set;
pub mod pool;
pub mod value_store;

pub use ids::IdAllocator;
pub use ordered_set::OrderedSet;
pub use pool::{Pool, PoolStats, Recycle};
pub use value_store::{ValueKey, ValueStore};
