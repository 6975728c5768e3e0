//! Cumulative policy counters and the stat records built from them.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::{ArcMetrics, PolicyMetrics};
pub use snapshot::{ArcStatsSnapshot, PolicyStats};
