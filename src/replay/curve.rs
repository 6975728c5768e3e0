//! Miss-ratio curve over a series of capacity probes.
//!
//! ## Probe Layout
//!
//! ```text
//!   distinct keys D, probes P, unit = D / P (integer division)
//!
//!   probe:     0        1        2              P-1
//!   capacity:  unit     2·unit   3·unit   ...   P·unit
//!   run cap:   floor(capacity × rate)
//! ```
//!
//! Every probe builds a fresh policy with its run capacity, replays the
//! whole trace through the sampler, and reports
//!
//! ```text
//!   Scaled:    misses / ((N - 1) × rate)      N = entries incl. sentinel
//!   Observed:  misses / (hits + misses)
//! ```
//!
//! A zero denominator yields `0.0`. A probe whose policy cannot be
//! allocated is reported with ratio `0.0` and `skipped = true`; the run
//! continues.
//!
//! ## Parallelism
//!
//! Probes share nothing but the read-only trace. With `jobs > 1` they are
//! claimed from an atomic counter by scoped worker threads; results are
//! returned in probe order regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::builder::{Policy, PolicyKind};
use crate::config::{validate_jobs, validate_probes, validate_sample_rate, MissRatioBasis};
use crate::error::{AllocError, ConfigError, Result};
use crate::replay::{replay, ReplayContext, Sampler};
use crate::trace::Trace;
use crate::traits::{PolicyOptions, ReadOnlyPolicy};

// ---------------------------------------------------------------------------
// CurveConfig
// ---------------------------------------------------------------------------

/// Parameters of one miss-ratio-curve run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveConfig {
    pub policy: PolicyKind,
    /// Fraction of the key space replayed, in `(0, 1]`.
    pub sample_rate: f64,
    /// Number of capacity probes, `> 0`.
    pub probes: u64,
    pub options: PolicyOptions,
    /// Unmeasured full passes before the measured one.
    pub warmup_passes: u32,
    pub miss_ratio_basis: MissRatioBasis,
    /// Worker threads for probes, `> 0`.
    pub jobs: usize,
}

impl CurveConfig {
    /// Config with default options, no warm-up, scaled basis, one job.
    pub fn new(policy: PolicyKind, sample_rate: f64, probes: u64) -> Self {
        Self {
            policy,
            sample_rate,
            probes,
            options: PolicyOptions::default(),
            warmup_passes: 0,
            miss_ratio_basis: MissRatioBasis::default(),
            jobs: 1,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        validate_sample_rate(self.sample_rate)?;
        validate_probes(self.probes)?;
        validate_jobs(self.jobs)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ProbeResult
// ---------------------------------------------------------------------------

/// Outcome of one capacity probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    /// 0-based probe index.
    pub index: u64,
    /// Nominal capacity, before scaling by the sampling rate.
    pub capacity: u64,
    /// Capacity the policy actually ran with.
    pub run_capacity: u64,
    pub miss_ratio: f64,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub hits: u64,
    pub misses: u64,
    /// `true` if the policy could not be allocated for this probe.
    pub skipped: bool,
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(elapsed.as_secs_f64())
}

// ---------------------------------------------------------------------------
// CurveDriver
// ---------------------------------------------------------------------------

/// Builds the policy a probe replays against.
pub type PolicyCtor = fn(PolicyKind, u32, u64, PolicyOptions) -> std::result::Result<Policy, AllocError>;

/// Runs every capacity probe of a [`CurveConfig`] against one trace.
///
/// # Example
///
/// ```
/// use mrckit::builder::PolicyKind;
/// use mrckit::replay::{CurveConfig, CurveDriver};
/// use mrckit::trace::Trace;
///
/// let mut keys: Vec<u32> = (0..4).cycle().take(40).collect();
/// keys.push(4);
/// let trace = Trace::from_entries(keys).unwrap();
///
/// let driver = CurveDriver::new(&trace, CurveConfig::new(PolicyKind::Lru, 1.0, 2)).unwrap();
/// let curve = driver.run();
/// assert_eq!(curve.len(), 2);
/// assert_eq!(curve[0].capacity, 2);
/// assert_eq!(curve[1].capacity, 4);
/// assert!(curve[1].miss_ratio < curve[0].miss_ratio);
/// ```
#[derive(Debug)]
pub struct CurveDriver<'t> {
    trace: &'t Trace,
    config: CurveConfig,
    distinct_keys: u64,
    build_policy: PolicyCtor,
}

impl<'t> CurveDriver<'t> {
    /// Validates `config` and counts the trace's distinct keys.
    ///
    /// # Errors
    ///
    /// [`ReplayError::Config`](crate::error::ReplayError::Config) for a bad
    /// config; [`ReplayError::Alloc`](crate::error::ReplayError::Alloc) if the
    /// distinct-key bitmap cannot be allocated.
    pub fn new(trace: &'t Trace, config: CurveConfig) -> Result<Self> {
        config.validate()?;
        let distinct_keys = trace.distinct_keys()?;
        info!(
            policy = %config.policy,
            rate = config.sample_rate,
            probes = config.probes,
            entries = trace.len(),
            distinct_keys,
            "starting miss-ratio curve"
        );
        Ok(Self {
            trace,
            config,
            distinct_keys,
            build_policy: PolicyKind::build,
        })
    }

    /// Replaces how each probe constructs its policy.
    ///
    /// Defaults to [`PolicyKind::build`].
    pub fn with_policy_ctor(mut self, build_policy: PolicyCtor) -> Self {
        self.build_policy = build_policy;
        self
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Distinct keys in the trace: the largest capacity probed.
    pub fn distinct_keys(&self) -> u64 {
        self.distinct_keys
    }

    /// Nominal capacity of probe `index`.
    pub fn probe_capacity(&self, index: u64) -> u64 {
        (self.distinct_keys / self.config.probes) * (index + 1)
    }

    /// Runs one probe from scratch.
    pub fn run_probe(&self, index: u64) -> ProbeResult {
        let capacity = self.probe_capacity(index);
        let rate = self.config.sample_rate;
        let run_capacity = (capacity as f64 * rate) as u64;
        let started = Instant::now();

        let mut policy = match (self.build_policy)(
            self.config.policy,
            self.trace.nr_keys(),
            run_capacity,
            self.config.options,
        ) {
            Ok(policy) => policy,
            Err(err) => {
                warn!(probe = index, capacity, %err, "skipping probe");
                return ProbeResult {
                    index,
                    capacity,
                    run_capacity,
                    miss_ratio: 0.0,
                    elapsed: started.elapsed(),
                    hits: 0,
                    misses: 0,
                    skipped: true,
                };
            },
        };

        replay(
            &mut ReplayContext::new(self.trace, &mut policy, Sampler::new(rate))
                .with_warmup_passes(self.config.warmup_passes),
        );
        let stats = policy.collect_stat();
        let miss_ratio = self.miss_ratio(stats.hits, stats.misses);
        let elapsed = started.elapsed();

        debug!(
            probe = index,
            capacity,
            run_capacity,
            hits = stats.hits,
            misses = stats.misses,
            miss_ratio,
            elapsed_secs = elapsed.as_secs_f64(),
            "probe finished"
        );
        ProbeResult {
            index,
            capacity,
            run_capacity,
            miss_ratio,
            elapsed,
            hits: stats.hits,
            misses: stats.misses,
            skipped: false,
        }
    }

    fn miss_ratio(&self, hits: u64, misses: u64) -> f64 {
        let denominator = match self.config.miss_ratio_basis {
            MissRatioBasis::Scaled => (self.trace.len() - 1) as f64 * self.config.sample_rate,
            MissRatioBasis::Observed => (hits + misses) as f64,
        };
        if denominator == 0.0 {
            0.0
        } else {
            misses as f64 / denominator
        }
    }

    /// Runs every probe and returns results in probe order.
    pub fn run(&self) -> Vec<ProbeResult> {
        let mut results = Vec::new();
        self.run_with(|result| results.push(result.clone()));
        results
    }

    /// Runs every probe, handing each result to `on_result` in probe order.
    ///
    /// With one job, each result is delivered as soon as its probe finishes.
    /// With several, delivery happens after all probes complete.
    pub fn run_with<F>(&self, mut on_result: F)
    where
        F: FnMut(&ProbeResult),
    {
        if self.config.jobs <= 1 || self.config.probes <= 1 {
            for index in 0..self.config.probes {
                on_result(&self.run_probe(index));
            }
            return;
        }
        for result in self.run_parallel() {
            on_result(&result);
        }
    }

    fn run_parallel(&self) -> Vec<ProbeResult> {
        let probes = self.config.probes;
        let workers = usize::try_from(probes).map_or(self.config.jobs, |p| self.config.jobs.min(p));
        let next = AtomicU64::new(0);
        let finished: Mutex<Vec<ProbeResult>> = Mutex::new(Vec::new());

        debug!(workers, probes, "running probes in parallel");
        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        if index >= probes {
                            break;
                        }
                        let result = self.run_probe(index);
                        finished.lock().push(result);
                    }
                });
            }
        });

        let mut results = finished.into_inner();
        results.sort_unstable_by_key(|r| r.index);
        assert_eq!(results.len() as u64, probes, "probe results missing");
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReplayError;

    fn trace_of(keys: &[u32], nr_keys: u32) -> Trace {
        let mut entries = keys.to_vec();
        entries.push(nr_keys);
        Trace::from_entries(entries).unwrap()
    }

    fn looping_trace() -> Trace {
        // Every third access walks all 500 keys; the rest stay in a hot 50.
        let keys: Vec<u32> = (0..10_000u32)
            .map(|i| if i % 3 == 0 { (i * 31) % 500 } else { (i * 7) % 50 })
            .collect();
        trace_of(&keys, 500)
    }

    #[test]
    fn probe_capacities_are_multiples_of_unit() {
        let trace = trace_of(&[0, 1, 2, 3, 4, 5, 6], 7);
        let driver = CurveDriver::new(&trace, CurveConfig::new(PolicyKind::Lru, 1.0, 3)).unwrap();
        assert_eq!(driver.distinct_keys(), 7);
        let caps: Vec<u64> = (0..3).map(|i| driver.probe_capacity(i)).collect();
        assert_eq!(caps, vec![2, 4, 6]);
    }

    #[test]
    fn more_probes_than_keys_gives_zero_capacity() {
        let trace = trace_of(&[0, 1, 0, 1], 2);
        let driver = CurveDriver::new(&trace, CurveConfig::new(PolicyKind::Arc, 1.0, 5)).unwrap();
        let curve = driver.run();
        assert_eq!(curve.len(), 5);
        assert!(curve.iter().all(|r| r.capacity == 0 && !r.skipped));
        // Scaled basis: 4 misses over N - 1 = 4 sampled accesses.
        assert!(curve.iter().all(|r| (r.miss_ratio - 1.0).abs() < 1e-12));
    }

    #[test]
    fn scaled_and_observed_agree_at_full_rate() {
        let trace = looping_trace();
        let mut cfg = CurveConfig::new(PolicyKind::Lru, 1.0, 4);
        let scaled = CurveDriver::new(&trace, cfg.clone()).unwrap().run();
        cfg.miss_ratio_basis = MissRatioBasis::Observed;
        let observed = CurveDriver::new(&trace, cfg).unwrap().run();
        for (a, b) in scaled.iter().zip(&observed) {
            assert_eq!(a.misses, b.misses);
            assert!((a.miss_ratio - b.miss_ratio).abs() < 1e-12);
        }
    }

    #[test]
    fn run_capacity_scales_with_rate() {
        let trace = looping_trace();
        let driver = CurveDriver::new(&trace, CurveConfig::new(PolicyKind::Arc, 0.3, 4)).unwrap();
        let result = driver.run_probe(3);
        assert_eq!(result.capacity, 500);
        assert_eq!(result.run_capacity, 150);
    }

    #[test]
    fn lru_curve_is_non_increasing() {
        let trace = looping_trace();
        let curve = CurveDriver::new(&trace, CurveConfig::new(PolicyKind::Lru, 1.0, 5))
            .unwrap()
            .run();
        for pair in curve.windows(2) {
            assert!(pair[1].miss_ratio <= pair[0].miss_ratio + 1e-12);
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let trace = looping_trace();
        let mut cfg = CurveConfig::new(PolicyKind::Arc, 0.5, 6);
        let sequential = CurveDriver::new(&trace, cfg.clone()).unwrap().run();
        cfg.jobs = 3;
        let parallel = CurveDriver::new(&trace, cfg).unwrap().run();

        assert_eq!(sequential.len(), parallel.len());
        for (s, p) in sequential.iter().zip(&parallel) {
            assert_eq!(s.index, p.index);
            assert_eq!(s.capacity, p.capacity);
            assert_eq!(s.hits, p.hits);
            assert_eq!(s.misses, p.misses);
        }
    }

    #[test]
    fn run_with_streams_in_order() {
        let trace = looping_trace();
        let driver = CurveDriver::new(&trace, CurveConfig::new(PolicyKind::Lru, 1.0, 4)).unwrap();
        let mut seen = Vec::new();
        driver.run_with(|r| seen.push(r.index));
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    fn fail_at_capacity_200(
        kind: PolicyKind,
        nr_keys: u32,
        capacity: u64,
        options: PolicyOptions,
    ) -> std::result::Result<Policy, AllocError> {
        if capacity == 200 {
            return Err(AllocError {
                what: "list arena",
                slots: nr_keys as usize + 1,
            });
        }
        kind.build(nr_keys, capacity, options)
    }

    #[test]
    fn alloc_failure_skips_one_probe_and_continues() {
        let trace = looping_trace();
        for jobs in [1, 3] {
            let mut cfg = CurveConfig::new(PolicyKind::Arc, 1.0, 5);
            cfg.jobs = jobs;
            let curve = CurveDriver::new(&trace, cfg)
                .unwrap()
                .with_policy_ctor(fail_at_capacity_200)
                .run();

            assert_eq!(curve.len(), 5);
            let skipped: Vec<u64> = curve.iter().filter(|r| r.skipped).map(|r| r.index).collect();
            assert_eq!(skipped, vec![1], "jobs = {jobs}");

            let failed = &curve[1];
            assert_eq!(failed.capacity, 200);
            assert_eq!(failed.miss_ratio, 0.0);
            assert_eq!(failed.hits + failed.misses, 0);

            for later in &curve[2..] {
                assert!(later.misses > 0);
                assert!(later.miss_ratio > 0.0);
            }
        }
    }

    #[test]
    fn parallel_run_handles_more_probes_than_jobs() {
        let trace = trace_of(&[0, 1, 2, 0, 1, 2], 3);
        let mut cfg = CurveConfig::new(PolicyKind::Lru, 1.0, 64);
        cfg.jobs = 4;
        let curve = CurveDriver::new(&trace, cfg).unwrap().run();
        let indices: Vec<u64> = curve.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let trace = looping_trace();
        let mut cfg = CurveConfig::new(PolicyKind::Lru, 1.0, 4);
        cfg.jobs = 0;
        assert!(matches!(
            CurveDriver::new(&trace, cfg),
            Err(ReplayError::Config(_))
        ));
        let cfg = CurveConfig::new(PolicyKind::Lru, 0.0, 4);
        assert!(matches!(
            CurveDriver::new(&trace, cfg),
            Err(ReplayError::Config(_))
        ));
    }

    #[test]
    fn probe_result_serializes_elapsed_as_seconds() {
        let result = ProbeResult {
            index: 1,
            capacity: 10,
            run_capacity: 5,
            miss_ratio: 0.25,
            elapsed: Duration::from_millis(1500),
            hits: 3,
            misses: 1,
            skipped: false,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["elapsed_secs"], 1.5);
        assert_eq!(json["capacity"], 10);
        assert_eq!(json["skipped"], false);
    }
}
