//! # Replacement Policy Contract
//!
//! Every eviction policy the simulator can replay a trace against implements
//! the same small operation set. Keys are dense integers in `[0, nr_keys)`;
//! policies never store values, only residency and recency/frequency state.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────────────────────┐
//!            │            ReadOnlyPolicy                │
//!            │                                          │
//!            │  name(&) → &'static str                  │
//!            │  nr_keys(&) → u32                        │
//!            │  capacity(&) → u64                       │
//!            │  len(&) → usize       (resident only)    │
//!            │  contains(&, key) → bool                 │
//!            │  collect_stat(&) → PolicyStats           │
//!            │  check_invariants(&) → Result<(), _>     │
//!            └────────────────────┬─────────────────────┘
//!                                 │
//!                                 ▼
//!            ┌──────────────────────────────────────────┐
//!            │          ReplacementPolicy               │
//!            │                                          │
//!            │  try_new(nr_keys, cap, opts) → Self      │
//!            │  set(&mut, key)                          │
//!            │  get(&mut, key) → bool (hit)             │
//!            │  delete(&mut, key) → bool (was resident) │
//!            │  clean_stat(&mut)                        │
//!            └────────────────────┬─────────────────────┘
//!                                 │
//!               ┌─────────────────┼──────────────────┐
//!               ▼                 ▼                  ▼
//!         ┌───────────┐     ┌───────────┐     ┌──────────────┐
//!         │ LruPolicy │     │ ArcPolicy │     │ builder::    │
//!         │           │     │           │     │ Policy (enum)│
//!         └───────────┘     └───────────┘     └──────────────┘
//! ```
//!
//! ## Operation Semantics
//!
//! | Operation     | Resident key                 | Absent key                          |
//! |---------------|------------------------------|-------------------------------------|
//! | `set`         | refresh position             | insert, evict down to capacity      |
//! | `get`         | hit, refresh position        | miss; `set` iff `insert_on_miss`    |
//! | `delete`      | remove (explicit removal)    | no-op (only the call is counted)    |
//! | `clean_stat`  | zero counters, keep contents | zero counters, keep contents        |
//!
//! ## Preconditions
//!
//! `key < nr_keys` for every keyed operation. The replay driver filters trace
//! entries before calling in; an out-of-range key reaching a policy is a
//! caller defect and panics.
//!
//! ## Thread Safety
//!
//! Policies are plain single-owner state. One probe owns one instance; the
//! curve driver never shares an instance across threads.

use serde::Serialize;

use crate::error::{AllocError, InvariantError};
use crate::metrics::PolicyStats;

/// Per-instance behavior switches fixed at construction.
///
/// # Example
///
/// ```
/// use mrckit::traits::PolicyOptions;
///
/// let opts = PolicyOptions::default();
/// assert!(opts.insert_on_miss);
///
/// let read_only = PolicyOptions { insert_on_miss: false };
/// assert!(!read_only.insert_on_miss);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyOptions {
    /// When `true`, a `get` miss inserts the key as if `set` had been called.
    pub insert_on_miss: bool,
}

impl Default for PolicyOptions {
    /// Defaults: `insert_on_miss = true`.
    fn default() -> Self {
        Self {
            insert_on_miss: true,
        }
    }
}

/// Read-only view shared by every policy.
pub trait ReadOnlyPolicy {
    /// Short display name, e.g. `"LRU"`.
    fn name(&self) -> &'static str;

    /// Size of the key space this instance was built for.
    fn nr_keys(&self) -> u32;

    /// Configured maximum number of resident keys.
    fn capacity(&self) -> u64;

    /// Current number of resident keys (ghost history excluded).
    fn len(&self) -> usize;

    /// Returns `true` if no key is resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is resident. Does not touch recency state.
    fn contains(&self, key: u32) -> bool;

    /// Options this instance was constructed with.
    fn options(&self) -> PolicyOptions;

    /// Snapshot of occupancy and cumulative counters since the last reset.
    fn collect_stat(&self) -> PolicyStats;

    /// Full structural audit of the internal lists and bounds.
    ///
    /// O(nr_keys); intended for tests and fuzzing, not the replay hot path.
    fn check_invariants(&self) -> Result<(), InvariantError>;
}

/// Mutating operations of a replacement policy.
///
/// # Example
///
/// ```
/// use mrckit::policy::lru::LruPolicy;
/// use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};
///
/// fn hits_over<P: ReplacementPolicy>(policy: &mut P, keys: &[u32]) -> u64 {
///     policy.clean_stat();
///     for &k in keys {
///         policy.get(k);
///     }
///     policy.collect_stat().hits
/// }
///
/// let mut lru = LruPolicy::try_new(4, 2, PolicyOptions::default()).unwrap();
/// assert_eq!(hits_over(&mut lru, &[0, 0, 1, 0]), 2);
/// ```
pub trait ReplacementPolicy: ReadOnlyPolicy {
    /// Builds an empty instance over keys `[0, nr_keys)` holding at most
    /// `capacity` resident keys.
    ///
    /// Fails only if the list arenas cannot be allocated.
    fn try_new(nr_keys: u32, capacity: u64, options: PolicyOptions) -> Result<Self, AllocError>
    where
        Self: Sized;

    /// Inserts or refreshes `key`, evicting as needed to respect capacity.
    fn set(&mut self, key: u32);

    /// Read-touch of `key`; returns `true` on a hit.
    fn get(&mut self, key: u32) -> bool;

    /// Removes `key` if resident; returns `true` if it was.
    fn delete(&mut self, key: u32) -> bool;

    /// Zeroes cumulative counters without changing cache contents.
    fn clean_stat(&mut self);
}
