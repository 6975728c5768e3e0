//! mrckit: offline cache-replacement simulation and miss-ratio curves.
//!
//! A trace of `u32` keys is replayed against a replacement policy (LRU or
//! ARC) at a series of capacities; the fraction of misses at each capacity
//! forms the miss-ratio curve.
//!
//! ```text
//!   Trace ──► CurveDriver ──► probe i: PolicyKind::build(cap_i)
//!                               │
//!                               ▼
//!                         replay(ReplayContext) ──► Sampler filter ──► policy.get
//!                               │
//!                               ▼
//!                         ProbeResult ──► report::ProbeLine
//! ```

pub mod builder;
pub mod config;
pub mod ds;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod replay;
pub mod report;
pub mod trace;
pub mod tracegen;
pub mod traits;
