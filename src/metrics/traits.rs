//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting, and resetting are split into small traits so the
//! policy code only ever *writes* counters and the replay driver only ever
//! *reads* them.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────────┐
//!                  │       CoreMetricsRecorder        │
//!                  │  set/get_hit/get_miss/delete     │
//!                  │  removal/eviction                │
//!                  └────────────────┬─────────────────┘
//!                                   │
//!                  ┌────────────────┴─────────────────┐
//!                  ▼                                  ▼
//!           ┌───────────────┐                ┌─────────────────┐
//!           │ PolicyMetrics │                │ ArcMetrics      │
//!           │ (LRU)         │                │ + ghost hits    │
//!           └───────────────┘                │ + demotions     │
//!                                            └─────────────────┘
//!
//!   Consumption:
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset                 │
//!   │ (collect_stat)               │    │ (clean_stat)                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! ## Design Goals
//! - Counters are cumulative since the last reset.
//! - Resetting never touches cache contents, so one warmed cache can be
//!   measured over several successive windows.

/// Common counters for any replacement policy.
pub trait CoreMetricsRecorder {
    fn record_set(&mut self);
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_delete_call(&mut self);
    /// A `delete` that found the key resident.
    fn record_removal(&mut self);
    /// A resident key pushed out to respect capacity.
    fn record_eviction(&mut self);
}

/// Metrics for ARC behavior (adaptive replacement with ghost lists).
pub trait ArcMetricsRecorder: CoreMetricsRecorder {
    fn record_t1_to_t2_promotion(&mut self);
    fn record_b1_ghost_hit(&mut self);
    fn record_b2_ghost_hit(&mut self);
    fn record_t1_demotion(&mut self);
    fn record_t2_demotion(&mut self);
}

/// Snapshot provider for the replay driver and tests.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Zero cumulative counters between measurement windows.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}
