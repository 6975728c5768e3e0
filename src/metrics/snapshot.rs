use serde::Serialize;

use crate::metrics::metrics_impl::{ArcMetrics, PolicyMetrics};

/// Point-in-time stat record for one policy instance.
///
/// `hits` and the other counters are cumulative since the last
/// `clean_stat`; `size` is the resident occupancy at snapshot time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PolicyStats {
    pub name: &'static str,
    pub nr_keys: u32,
    pub capacity: u64,
    pub size: u64,

    pub hits: u64,
    pub misses: u64,

    pub sets: u64,
    pub gets: u64,
    pub deletes: u64,
    pub evictions: u64,
    pub removals: u64,
}

impl PolicyStats {
    pub(crate) fn from_metrics(
        name: &'static str,
        nr_keys: u32,
        capacity: u64,
        size: u64,
        metrics: &PolicyMetrics,
    ) -> Self {
        Self {
            name,
            nr_keys,
            capacity,
            size,
            hits: metrics.hits,
            misses: metrics.misses,
            sets: metrics.sets,
            gets: metrics.gets,
            deletes: metrics.deletes,
            evictions: metrics.evictions,
            removals: metrics.removals,
        }
    }

    /// Returns `hits + misses`.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Returns `misses / (hits + misses)`, or `0.0` before any access.
    pub fn observed_miss_ratio(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.misses as f64 / total as f64
        }
    }
}

/// ARC-specific snapshot: the common record plus list sizes and adaptation
/// signals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArcStatsSnapshot {
    pub stats: PolicyStats,

    pub p: u64,
    pub t1_len: usize,
    pub t2_len: usize,
    pub b1_len: usize,
    pub b2_len: usize,

    pub t1_to_t2_promotions: u64,
    pub b1_ghost_hits: u64,
    pub b2_ghost_hits: u64,
    pub t1_demotions: u64,
    pub t2_demotions: u64,
}

impl ArcStatsSnapshot {
    pub(crate) fn with_metrics(mut self, metrics: &ArcMetrics) -> Self {
        self.t1_to_t2_promotions = metrics.t1_to_t2_promotions;
        self.b1_ghost_hits = metrics.b1_ghost_hits;
        self.b2_ghost_hits = metrics.b2_ghost_hits;
        self.t1_demotions = metrics.t1_demotions;
        self.t2_demotions = metrics.t2_demotions;
        self
    }
}
