//! Least Recently Used (LRU) replacement policy.
//!
//! One [`IndexList`] holds every resident key in recency order. A hit moves
//! the key to the front; when occupancy exceeds capacity the back of the
//! list is evicted.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │                        LruPolicy                             │
//!   │                                                              │
//!   │   list: IndexList (nr_keys + 1 slots)                        │
//!   │                                                              │
//!   │   sentinel ─► [MRU] ◄──► [ ... ] ◄──► [LRU] ◄─ sentinel      │
//!   │                 ▲                        │                   │
//!   │                 │ set / get hit          │ evict while       │
//!   │                 │ (move_to_front)        ▼ len > capacity    │
//!   │                                      pop_back()              │
//!   │                                                              │
//!   │   metrics: PolicyMetrics (hits, misses, evictions, ...)      │
//!   └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation | Time | Notes                                         |
//! |-----------|------|-----------------------------------------------|
//! | `set`     | O(1) | insert or refresh; may evict several on entry |
//! | `get`     | O(1) | hit promotes; miss inserts iff configured     |
//! | `delete`  | O(1) | explicit removal, not an eviction             |
//! | `contains`| O(1) | no recency side effect                        |
//!
//! ## Example Usage
//!
//! ```
//! use mrckit::policy::lru::LruPolicy;
//! use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};
//!
//! let mut lru = LruPolicy::try_new(10, 2, PolicyOptions::default()).unwrap();
//! lru.set(1);
//! lru.set(2);
//! assert!(lru.get(1)); // 1 is now MRU
//! lru.set(3); // evicts 2
//!
//! assert!(lru.contains(1));
//! assert!(!lru.contains(2));
//! assert_eq!(lru.collect_stat().evictions, 1);
//! ```

use crate::ds::IndexList;
use crate::error::{AllocError, InvariantError};
use crate::metrics::traits::{CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
use crate::metrics::{PolicyMetrics, PolicyStats};
use crate::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

/// LRU over the dense key space `[0, nr_keys)`.
#[derive(Debug, Clone)]
pub struct LruPolicy {
    list: IndexList,
    capacity: u64,
    options: PolicyOptions,
    metrics: PolicyMetrics,
}

impl LruPolicy {
    /// Returns resident keys from most to least recently used.
    pub fn keys_mru(&self) -> impl Iterator<Item = u32> + '_ {
        self.list.iter()
    }

    /// Returns the key that would be evicted next.
    pub fn peek_lru(&self) -> Option<u32> {
        self.list.back()
    }

    /// Inserts or refreshes without touching the `sets` counter.
    fn touch(&mut self, key: u32) {
        if !self.list.move_to_front(key) {
            self.list.push_front(key);
        }
        while self.list.len() as u64 > self.capacity {
            let victim = self.list.pop_back();
            assert!(victim.is_some(), "LRU over capacity with an empty list");
            self.metrics.record_eviction();
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("LRU invariant violated: {err}");
        }
    }
}

impl ReadOnlyPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "LRU"
    }

    #[inline]
    fn nr_keys(&self) -> u32 {
        self.list.nr_keys()
    }

    #[inline]
    fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    fn contains(&self, key: u32) -> bool {
        self.list.contains(key)
    }

    fn options(&self) -> PolicyOptions {
        self.options
    }

    fn collect_stat(&self) -> PolicyStats {
        self.snapshot()
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.list.len() as u64 > self.capacity {
            return Err(InvariantError::new(format!(
                "occupancy {} exceeds capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        Ok(())
    }
}

impl ReplacementPolicy for LruPolicy {
    fn try_new(nr_keys: u32, capacity: u64, options: PolicyOptions) -> Result<Self, AllocError> {
        Ok(Self {
            list: IndexList::try_new(nr_keys)?,
            capacity,
            options,
            metrics: PolicyMetrics::default(),
        })
    }

    #[inline]
    fn set(&mut self, key: u32) {
        self.metrics.record_set();
        self.touch(key);
    }

    #[inline]
    fn get(&mut self, key: u32) -> bool {
        if self.list.move_to_front(key) {
            self.metrics.record_get_hit();
            return true;
        }
        self.metrics.record_get_miss();
        if self.options.insert_on_miss {
            self.touch(key);
        }
        false
    }

    fn delete(&mut self, key: u32) -> bool {
        self.metrics.record_delete_call();
        let removed = self.list.remove(key);
        if removed {
            self.metrics.record_removal();
        }
        removed
    }

    fn clean_stat(&mut self) {
        self.metrics.reset_metrics();
    }
}

impl MetricsSnapshotProvider<PolicyStats> for LruPolicy {
    fn snapshot(&self) -> PolicyStats {
        PolicyStats::from_metrics(
            self.name(),
            self.nr_keys(),
            self.capacity,
            self.list.len() as u64,
            &self.metrics,
        )
    }
}
