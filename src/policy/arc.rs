//! Adaptive Replacement Cache (ARC) replacement policy.
//!
//! Balances recency against frequency with two resident lists and two ghost
//! lists, steered by the adaptive target `p` for the size of T1.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            ArcPolicy Layout                             │
//! │                                                                         │
//! │   Four IndexLists over the same key space, one arena each.              │
//! │   A key is linked into at most one of them.                             │
//! │                                                                         │
//! │   T1 (resident, seen once)              T2 (resident, seen again)       │
//! │   ┌─────────────────────────┐           ┌─────────────────────────┐     │
//! │   │ MRU               LRU   │           │ MRU               LRU   │     │
//! │   │  ▼                  ▼   │           │  ▼                  ▼   │     │
//! │   │ [7] ◄──► [3] ◄──► [9]   │           │ [1] ◄──► [4]            │     │
//! │   └────────────────────┬────┘           └───────────────────┬─────┘     │
//! │                        │ demote                             │ demote    │
//! │                        ▼                                    ▼           │
//! │   B1 (ghost of T1)                      B2 (ghost of T2)                │
//! │   ┌─────────────────────────┐           ┌─────────────────────────┐     │
//! │   │ keys only               │           │ keys only               │     │
//! │   └─────────────────────────┘           └─────────────────────────┘     │
//! │                                                                         │
//! │   p: target |T1|, in [0, capacity], starts at 0                         │
//! │     • hit in B1 → p += max(1, |B2| / |B1|)   (favor recency)            │
//! │     • hit in B2 → p -= max(1, |B1| / |B2|)   (favor frequency)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//!
//! set(key)
//! ────────
//!   T1 or T2 hit → T2 MRU
//!   B1 hit       → grow p, B1 → T2 MRU, replace()
//!   B2 hit       → shrink p, B2 → T2 MRU, replace()
//!   cold miss    → T1 MRU, replace(),
//!                  trim L1 = T1 + B1 to capacity (B1 LRU first),
//!                  trim T1 + T2 + B1 + B2 to 2 × capacity (B2 LRU first)
//!
//! replace()
//! ─────────
//!   while |T1| + |T2| > capacity:
//!     |T1| > p  → T1 LRU → B1
//!     otherwise → T2 LRU → B2
//! ```
//!
//! ## Bounds
//!
//! After every operation:
//! - `|T1| + |T2| <= capacity`
//! - `|T1| + |B1| <= capacity`
//! - `|T1| + |T2| + |B1| + |B2| <= 2 × capacity`
//! - `p <= capacity`
//!
//! ## Accounting
//!
//! Each demotion from a resident list into a ghost list counts as one
//! eviction, as does a resident key dropped outright by the cold-miss
//! trimming. Ghost entries falling off B1/B2 are not evictions. `delete`
//! touches only T1 and T2; ghost history survives it.
//!
//! ## Example Usage
//!
//! ```
//! use mrckit::policy::arc::{ArcList, ArcPolicy};
//! use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};
//!
//! let mut arc = ArcPolicy::try_new(16, 2, PolicyOptions::default()).unwrap();
//! arc.set(1);
//! arc.set(2);
//! assert_eq!(arc.list_of(1), Some(ArcList::T1));
//!
//! assert!(arc.get(1)); // promoted to T2
//! assert_eq!(arc.list_of(1), Some(ArcList::T2));
//!
//! arc.set(3); // T1 over target: 2 demoted to B1
//! assert_eq!(arc.list_of(2), Some(ArcList::B1));
//! assert!(!arc.contains(2));
//! assert_eq!(arc.len(), 2);
//! ```
//!
//! ## References
//!
//! - Megiddo & Modha, "ARC: A Self-Tuning, Low Overhead Replacement Cache",
//!   FAST 2003

use std::fmt;

use crate::ds::IndexList;
use crate::error::{AllocError, InvariantError};
use crate::metrics::traits::{
    ArcMetricsRecorder, CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider,
};
use crate::metrics::{ArcMetrics, ArcStatsSnapshot, PolicyStats};
use crate::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

/// Which of the four ARC lists a key is linked into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcList {
    /// Resident, referenced once since entry.
    T1,
    /// Resident, referenced at least twice.
    T2,
    /// Ghost of a key demoted from T1.
    B1,
    /// Ghost of a key demoted from T2.
    B2,
}

impl ArcList {
    /// Returns `true` for T1 and T2.
    pub fn is_resident(self) -> bool {
        matches!(self, ArcList::T1 | ArcList::T2)
    }
}

impl fmt::Display for ArcList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArcList::T1 => "T1",
            ArcList::T2 => "T2",
            ArcList::B1 => "B1",
            ArcList::B2 => "B2",
        };
        f.write_str(name)
    }
}

/// ARC over the dense key space `[0, nr_keys)`.
#[derive(Debug, Clone)]
pub struct ArcPolicy {
    /// Resident, seen once. Front = MRU.
    t1: IndexList,
    /// Resident, seen more than once. Front = MRU.
    t2: IndexList,
    /// Ghosts demoted from T1.
    b1: IndexList,
    /// Ghosts demoted from T2.
    b2: IndexList,

    /// Adaptive target size for T1.
    p: u64,
    capacity: u64,
    nr_keys: u32,
    options: PolicyOptions,
    metrics: ArcMetrics,
}

impl ArcPolicy {
    /// Current adaptive target for `|T1|`.
    #[inline]
    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn t1_len(&self) -> usize {
        self.t1.len()
    }

    pub fn t2_len(&self) -> usize {
        self.t2.len()
    }

    pub fn b1_len(&self) -> usize {
        self.b1.len()
    }

    pub fn b2_len(&self) -> usize {
        self.b2.len()
    }

    /// Returns the list `key` is linked into, if any.
    pub fn list_of(&self, key: u32) -> Option<ArcList> {
        if self.t1.contains(key) {
            Some(ArcList::T1)
        } else if self.t2.contains(key) {
            Some(ArcList::T2)
        } else if self.b1.contains(key) {
            Some(ArcList::B1)
        } else if self.b2.contains(key) {
            Some(ArcList::B2)
        } else {
            None
        }
    }

    /// Snapshot with list sizes, `p`, and the adaptation counters.
    pub fn arc_stats(&self) -> ArcStatsSnapshot {
        ArcStatsSnapshot {
            stats: MetricsSnapshotProvider::<PolicyStats>::snapshot(self),
            p: self.p,
            t1_len: self.t1.len(),
            t2_len: self.t2.len(),
            b1_len: self.b1.len(),
            b2_len: self.b2.len(),
            ..ArcStatsSnapshot::default()
        }
        .with_metrics(&self.metrics)
    }

    #[inline]
    fn resident_len(&self) -> u64 {
        (self.t1.len() + self.t2.len()) as u64
    }

    #[inline]
    fn total_len(&self) -> u64 {
        (self.t1.len() + self.t2.len() + self.b1.len() + self.b2.len()) as u64
    }

    /// Demotes resident LRU entries into the ghost lists until T1 + T2 fits.
    fn replace(&mut self) {
        while self.resident_len() > self.capacity {
            if self.t1.len() as u64 > self.p {
                let victim = self.t1.pop_back();
                let Some(victim) = victim else {
                    panic!("ARC T1 over target but empty");
                };
                self.b1.push_front(victim);
                self.metrics.record_t1_demotion();
            } else {
                let victim = self.t2.pop_back();
                let Some(victim) = victim else {
                    panic!("ARC over capacity with T1 within target and T2 empty");
                };
                self.b2.push_front(victim);
                self.metrics.record_t2_demotion();
            }
            self.metrics.record_eviction();
        }
    }

    /// Cold-miss path: admit into T1 and trim L1 and the whole directory.
    fn admit_cold(&mut self, key: u32) {
        self.t1.push_front(key);
        self.replace();

        while (self.t1.len() + self.b1.len()) as u64 > self.capacity {
            if self.b1.pop_back().is_none() {
                let dropped = self.t1.pop_back();
                assert!(dropped.is_some(), "ARC L1 over capacity with both lists empty");
                self.metrics.record_eviction();
            }
        }

        while self.total_len() > self.capacity.saturating_mul(2) {
            if self.b2.pop_back().is_none() {
                let dropped = self.t2.pop_back();
                assert!(dropped.is_some(), "ARC directory over 2c with B2 and T2 empty");
                self.metrics.record_eviction();
            }
        }
    }

    /// Shared by `set` and `get`; does not touch the `sets` counter.
    fn touch(&mut self, key: u32) {
        if self.t1.remove(key) {
            self.t2.push_front(key);
            self.metrics.record_t1_to_t2_promotion();
            return;
        }
        if self.t2.move_to_front(key) {
            return;
        }

        if self.b1.remove(key) {
            // `key` has already left B1, so count it back in for the ratio.
            let b1 = self.b1.len() as u64 + 1;
            let b2 = self.b2.len() as u64;
            let delta = (b2 / b1).max(1);
            self.p = self.p.saturating_add(delta).min(self.capacity);
            self.metrics.record_b1_ghost_hit();
            self.t2.push_front(key);
            self.replace();
        } else if self.b2.remove(key) {
            let b1 = self.b1.len() as u64;
            let b2 = self.b2.len() as u64 + 1;
            let delta = (b1 / b2).max(1);
            self.p = self.p.saturating_sub(delta);
            self.metrics.record_b2_ghost_hit();
            self.t2.push_front(key);
            self.replace();
        } else {
            self.admit_cold(key);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("ARC invariant violated: {err}");
        }
    }
}

impl ReadOnlyPolicy for ArcPolicy {
    fn name(&self) -> &'static str {
        "ARC"
    }

    #[inline]
    fn nr_keys(&self) -> u32 {
        self.nr_keys
    }

    #[inline]
    fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    fn len(&self) -> usize {
        self.t1.len() + self.t2.len()
    }

    #[inline]
    fn contains(&self, key: u32) -> bool {
        self.t1.contains(key) || self.t2.contains(key)
    }

    fn options(&self) -> PolicyOptions {
        self.options
    }

    fn collect_stat(&self) -> PolicyStats {
        MetricsSnapshotProvider::<PolicyStats>::snapshot(self)
    }

    fn check_invariants(&self) -> Result<(), InvariantError> {
        let lists = [
            (ArcList::T1, &self.t1),
            (ArcList::T2, &self.t2),
            (ArcList::B1, &self.b1),
            (ArcList::B2, &self.b2),
        ];
        for (which, list) in lists {
            list.check_invariants()
                .map_err(|e| InvariantError::new(format!("{which}: {e}")))?;
        }

        for key in 0..self.nr_keys {
            let memberships = lists.iter().filter(|(_, l)| l.contains(key)).count();
            if memberships > 1 {
                return Err(InvariantError::new(format!(
                    "key {key} is linked into {memberships} lists"
                )));
            }
        }

        let c = self.capacity;
        let t1 = self.t1.len() as u64;
        let t2 = self.t2.len() as u64;
        let b1 = self.b1.len() as u64;
        if t1 + t2 > c {
            return Err(InvariantError::new(format!(
                "|T1| + |T2| = {} exceeds capacity {c}",
                t1 + t2
            )));
        }
        if t1 + b1 > c {
            return Err(InvariantError::new(format!(
                "|T1| + |B1| = {} exceeds capacity {c}",
                t1 + b1
            )));
        }
        if self.total_len() > c.saturating_mul(2) {
            return Err(InvariantError::new(format!(
                "directory size {} exceeds 2 x capacity {c}",
                self.total_len()
            )));
        }
        if self.p > c {
            return Err(InvariantError::new(format!(
                "p = {} exceeds capacity {c}",
                self.p
            )));
        }
        Ok(())
    }
}

impl ReplacementPolicy for ArcPolicy {
    fn try_new(nr_keys: u32, capacity: u64, options: PolicyOptions) -> Result<Self, AllocError> {
        Ok(Self {
            t1: IndexList::try_new(nr_keys)?,
            t2: IndexList::try_new(nr_keys)?,
            b1: IndexList::try_new(nr_keys)?,
            b2: IndexList::try_new(nr_keys)?,
            p: 0,
            capacity,
            nr_keys,
            options,
            metrics: ArcMetrics::default(),
        })
    }

    #[inline]
    fn set(&mut self, key: u32) {
        self.metrics.record_set();
        self.touch(key);
    }

    #[inline]
    fn get(&mut self, key: u32) -> bool {
        if self.contains(key) {
            self.metrics.record_get_hit();
            self.touch(key);
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
        let removed = self.t1.remove(key) || self.t2.remove(key);
        if removed {
            self.metrics.record_removal();
        }
        removed
    }

    fn clean_stat(&mut self) {
        self.metrics.reset_metrics();
    }
}

impl MetricsSnapshotProvider<PolicyStats> for ArcPolicy {
    fn snapshot(&self) -> PolicyStats {
        PolicyStats::from_metrics(
            self.name(),
            self.nr_keys,
            self.capacity,
            self.resident_len(),
            &self.metrics.core,
        )
    }
}

impl MetricsSnapshotProvider<ArcStatsSnapshot> for ArcPolicy {
    fn snapshot(&self) -> ArcStatsSnapshot {
        self.arc_stats()
    }
}
