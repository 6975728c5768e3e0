//! Single-policy trace replay.
//!
//! A pass zeroes the policy's counters, then feeds every entry that is a
//! valid key and passes the sampler to `get`. The sentinel and any other
//! entry `>= nr_keys` is skipped. Warm-up passes run first with the same
//! rules; since each pass starts with `clean_stat`, only the final pass is
//! reflected in the policy's stats.

use crate::replay::Sampler;
use crate::trace::Trace;
use crate::traits::ReplacementPolicy;

/// Everything one replay needs: the trace, the policy it drives, and the
/// sampling window.
#[derive(Debug)]
pub struct ReplayContext<'a, P> {
    pub trace: &'a Trace,
    pub policy: &'a mut P,
    pub sampler: Sampler,
    /// Extra full passes run before the measured one.
    pub warmup_passes: u32,
}

impl<'a, P: ReplacementPolicy> ReplayContext<'a, P> {
    pub fn new(trace: &'a Trace, policy: &'a mut P, sampler: Sampler) -> Self {
        Self {
            trace,
            policy,
            sampler,
            warmup_passes: 0,
        }
    }

    pub fn with_warmup_passes(mut self, passes: u32) -> Self {
        self.warmup_passes = passes;
        self
    }
}

/// Runs the warm-up passes and then the measured pass.
///
/// # Example
///
/// ```
/// use mrckit::policy::lru::LruPolicy;
/// use mrckit::replay::{replay, ReplayContext, Sampler};
/// use mrckit::trace::Trace;
/// use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};
///
/// let trace = Trace::from_entries(vec![0, 1, 0, 1, 2]).unwrap();
/// let mut lru = LruPolicy::try_new(trace.nr_keys(), 2, PolicyOptions::default()).unwrap();
///
/// replay(&mut ReplayContext::new(&trace, &mut lru, Sampler::new(1.0)));
/// let stats = lru.collect_stat();
/// assert_eq!((stats.hits, stats.misses), (2, 2));
/// ```
pub fn replay<P: ReplacementPolicy>(ctx: &mut ReplayContext<'_, P>) {
    for _ in 0..ctx.warmup_passes {
        full_pass(ctx.trace, ctx.policy, ctx.sampler);
    }
    full_pass(ctx.trace, ctx.policy, ctx.sampler);
}

/// One measured pass; returns how many entries reached the policy.
pub fn full_pass<P: ReplacementPolicy>(trace: &Trace, policy: &mut P, sampler: Sampler) -> u64 {
    policy.clean_stat();
    let nr_keys = trace.nr_keys();
    let mut fed = 0u64;
    for key in trace.iter() {
        if key < nr_keys && sampler.includes(key) {
            policy.get(key);
            fed += 1;
        }
    }
    fed
}
