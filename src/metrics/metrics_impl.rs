use crate::metrics::traits::{ArcMetricsRecorder, CoreMetricsRecorder, MetricsReset};

// ---------------------------------------------------------------------------
// PolicyMetrics
// ---------------------------------------------------------------------------

/// Cumulative counters shared by every policy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PolicyMetrics {
    pub sets: u64,
    pub gets: u64,
    pub deletes: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub removals: u64,
}

impl CoreMetricsRecorder for PolicyMetrics {
    #[inline]
    fn record_set(&mut self) {
        self.sets += 1;
    }
    #[inline]
    fn record_get_hit(&mut self) {
        self.gets += 1;
        self.hits += 1;
    }
    #[inline]
    fn record_get_miss(&mut self) {
        self.gets += 1;
        self.misses += 1;
    }
    #[inline]
    fn record_delete_call(&mut self) {
        self.deletes += 1;
    }
    #[inline]
    fn record_removal(&mut self) {
        self.removals += 1;
    }
    #[inline]
    fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

impl MetricsReset for PolicyMetrics {
    fn reset_metrics(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// ArcMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArcMetrics {
    pub core: PolicyMetrics,
    pub t1_to_t2_promotions: u64,
    pub b1_ghost_hits: u64,
    pub b2_ghost_hits: u64,
    pub t1_demotions: u64,
    pub t2_demotions: u64,
}

impl CoreMetricsRecorder for ArcMetrics {
    #[inline]
    fn record_set(&mut self) {
        self.core.record_set();
    }
    #[inline]
    fn record_get_hit(&mut self) {
        self.core.record_get_hit();
    }
    #[inline]
    fn record_get_miss(&mut self) {
        self.core.record_get_miss();
    }
    #[inline]
    fn record_delete_call(&mut self) {
        self.core.record_delete_call();
    }
    #[inline]
    fn record_removal(&mut self) {
        self.core.record_removal();
    }
    #[inline]
    fn record_eviction(&mut self) {
        self.core.record_eviction();
    }
}

impl ArcMetricsRecorder for ArcMetrics {
    #[inline]
    fn record_t1_to_t2_promotion(&mut self) {
        self.t1_to_t2_promotions += 1;
    }
    #[inline]
    fn record_b1_ghost_hit(&mut self) {
        self.b1_ghost_hits += 1;
    }
    #[inline]
    fn record_b2_ghost_hit(&mut self) {
        self.b2_ghost_hits += 1;
    }
    #[inline]
    fn record_t1_demotion(&mut self) {
        self.t1_demotions += 1;
    }
    #[inline]
    fn record_t2_demotion(&mut self) {
        self.t2_demotions += 1;
    }
}

impl MetricsReset for ArcMetrics {
    fn reset_metrics(&mut self) {
        *self = Self::default();
    }
}
