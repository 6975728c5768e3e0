//! DHAT heap profiler for mrckit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use mrckit::builder::PolicyKind;
use mrckit::replay::{CurveConfig, CurveDriver};
use mrckit::trace::Trace;
use mrckit::tracegen;
use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

const KEY_SPACE: u32 = 16_384;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        const SCALE: f64 = 1.0 / (u64::MAX as f64);
        (self.next_u64() as f64) * SCALE
    }
}

/// Hotset workload: 90% of accesses hit 10% of keys.
fn hotset_keys(operations: usize, seed: u64) -> Vec<u32> {
    let mut rng = XorShift64::new(seed);
    let hot = u64::from(KEY_SPACE / 10);
    (0..operations)
        .map(|_| {
            if rng.next_f64() < 0.9 {
                (rng.next_u64() % hot) as u32
            } else {
                (hot + rng.next_u64() % (u64::from(KEY_SPACE) - hot)) as u32
            }
        })
        .collect()
}

fn profile_policy(kind: PolicyKind) {
    println!("=== Profiling {} ===", kind);
    let capacity = 4096;
    let operations = 100_000;

    let Ok(mut policy) = kind.build(KEY_SPACE, capacity, PolicyOptions::default()) else {
        println!("  allocation failed");
        return;
    };

    for key in hotset_keys(operations, 42) {
        policy.get(key);
    }
    // Scan
    for i in 0..operations / 2 {
        policy.get((i as u32) % KEY_SPACE);
    }

    let stats = policy.collect_stat();
    println!(
        "  Final size: {}  hits: {}  misses: {}",
        policy.len(),
        stats.hits,
        stats.misses
    );
}

fn profile_curve(kind: PolicyKind) {
    println!("=== Profiling {} curve ===", kind);
    let Ok(trace) = Trace::from_entries(tracegen::generate(200_000, 7)) else {
        println!("  trace rejected");
        return;
    };
    match CurveDriver::new(&trace, CurveConfig::new(kind, 0.5, 8)) {
        Ok(driver) => println!("  probes: {}", driver.run().len()),
        Err(err) => println!("  {err}"),
    }
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("mrckit DHAT Heap Profiling");
    println!("==========================\n");

    for kind in PolicyKind::ALL {
        profile_policy(kind);
        profile_curve(kind);
    }

    println!("\n==========================");
    println!("Profile written to dhat-heap.json");
}
