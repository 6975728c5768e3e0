// ==============================================
// CROSS-POLICY INVARIANT TESTS (integration)
// ==============================================
//
// Behavior every replacement policy must share, plus randomized operation
// sequences that audit each policy's internal structure after every step.

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use mrckit::builder::{Policy, PolicyKind};
use mrckit::policy::arc::{ArcList, ArcPolicy};
use mrckit::policy::lru::LruPolicy;
use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

fn build(kind: PolicyKind, nr_keys: u32, capacity: u64) -> Policy {
    kind.build(nr_keys, capacity, PolicyOptions::default())
        .unwrap()
}

// ==============================================
// Fixed Scenarios
// ==============================================

mod scenarios {
    use super::*;

    /// 0,1,2 repeated three times at capacity 2.
    fn cyclic_misses(kind: PolicyKind) -> (u64, u64) {
        let mut policy = build(kind, 3, 2);
        for _ in 0..3 {
            for key in 0..3 {
                policy.get(key);
            }
        }
        let stats = policy.collect_stat();
        (stats.hits, stats.misses)
    }

    #[test]
    fn lru_cyclic_trace_misses_every_access() {
        assert_eq!(cyclic_misses(PolicyKind::Lru), (0, 9));
    }

    #[test]
    fn arc_never_worse_than_lru_on_cyclic_trace() {
        let (_, lru_misses) = cyclic_misses(PolicyKind::Lru);
        let (arc_hits, arc_misses) = cyclic_misses(PolicyKind::Arc);
        assert_eq!(arc_hits + arc_misses, 9);
        assert!(arc_misses <= lru_misses);
    }

    #[test]
    fn promotion_round_trip_hits() {
        for kind in PolicyKind::ALL {
            let mut policy = build(kind, 16, 4);
            policy.set(9);
            assert!(policy.get(9), "{kind}: set then get must hit");
        }
    }

    #[test]
    fn delete_is_idempotent() {
        for kind in PolicyKind::ALL {
            let mut policy = build(kind, 16, 4);
            policy.set(3);
            assert!(policy.delete(3));
            let len = policy.len();
            assert!(!policy.delete(3));
            assert_eq!(policy.len(), len);
            assert!(!policy.contains(3));
        }
    }

    #[test]
    fn capacity_zero_is_honored() {
        for kind in PolicyKind::ALL {
            let mut policy = build(kind, 8, 0);
            for key in 0..8 {
                policy.get(key);
                policy.set(key);
            }
            assert_eq!(policy.capacity(), 0, "{kind}");
            assert!(policy.is_empty(), "{kind} with capacity 0 must stay empty");
            assert_eq!(policy.collect_stat().hits, 0);
        }
    }

    #[test]
    fn capacity_at_key_space_never_evicts_after_warmup() {
        for kind in PolicyKind::ALL {
            let mut policy = build(kind, 32, 32);
            for key in 0..32 {
                policy.get(key);
            }
            policy.clean_stat();
            for key in (0..32).rev() {
                assert!(policy.get(key), "{kind}: key {key} should be resident");
            }
            assert_eq!(policy.collect_stat().evictions, 0);
        }
    }

    #[test]
    fn arc_scan_does_not_flush_frequent_keys() {
        let mut arc = ArcPolicy::try_new(1_000, 10, PolicyOptions::default()).unwrap();
        // Make 0..5 frequent.
        for _ in 0..3 {
            for key in 0..5 {
                arc.get(key);
            }
        }
        // One-shot scan over fresh keys.
        for key in 100..400 {
            arc.get(key);
        }
        let survivors = (0..5).filter(|&k| arc.contains(k)).count();
        assert!(survivors > 0, "scan evicted every frequent key");
        arc.debug_validate_invariants();
    }
}

// ==============================================
// Randomized Operation Sequences
// ==============================================

#[derive(Debug, Clone, Copy)]
enum Op {
    Set(u32),
    Get(u32),
    Delete(u32),
    CleanStat,
}

fn op_strategy(nr_keys: u32) -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..nr_keys).prop_map(Op::Set),
        6 => (0..nr_keys).prop_map(Op::Get),
        1 => (0..nr_keys).prop_map(Op::Delete),
        1 => Just(Op::CleanStat),
    ]
}

fn ops_strategy() -> impl Strategy<Value = (u32, u64, bool, Vec<Op>)> {
    (1u32..48, 0u64..24, any::<bool>()).prop_flat_map(|(nr_keys, capacity, insert_on_miss)| {
        (
            Just(nr_keys),
            Just(capacity),
            Just(insert_on_miss),
            prop::collection::vec(op_strategy(nr_keys), 0..300),
        )
    })
}

fn apply<P: ReplacementPolicy>(policy: &mut P, op: Op) {
    match op {
        Op::Set(k) => policy.set(k),
        Op::Get(k) => {
            policy.get(k);
        },
        Op::Delete(k) => {
            policy.delete(k);
        },
        Op::CleanStat => policy.clean_stat(),
    }
}

/// Recency-ordered model of LRU: front is most recent.
#[derive(Default)]
struct LruModel {
    order: Vec<u32>,
    capacity: usize,
    insert_on_miss: bool,
}

impl LruModel {
    fn touch(&mut self, key: u32) {
        self.order.retain(|&k| k != key);
        self.order.insert(0, key);
        self.order.truncate(self.capacity);
    }

    fn apply(&mut self, op: Op) {
        match op {
            Op::Set(k) => self.touch(k),
            Op::Get(k) => {
                if self.order.contains(&k) || self.insert_on_miss {
                    self.touch(k);
                }
            },
            Op::Delete(k) => self.order.retain(|&x| x != k),
            Op::CleanStat => {},
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// LRU residency and order match a straightforward model after every op.
    #[test]
    fn prop_lru_matches_model((nr_keys, capacity, insert_on_miss, ops) in ops_strategy()) {
        let options = PolicyOptions { insert_on_miss };
        let mut lru = LruPolicy::try_new(nr_keys, capacity, options).unwrap();
        let mut model = LruModel {
            capacity: capacity as usize,
            insert_on_miss,
            ..LruModel::default()
        };

        for op in ops {
            apply(&mut lru, op);
            model.apply(op);
            prop_assert!(lru.check_invariants().is_ok());
            prop_assert_eq!(lru.keys_mru().collect::<Vec<_>>(), model.order.clone());
        }
    }

    /// ARC keeps its list bounds and disjointness after every op.
    #[test]
    fn prop_arc_bounds_hold((nr_keys, capacity, insert_on_miss, ops) in ops_strategy()) {
        let options = PolicyOptions { insert_on_miss };
        let mut arc = ArcPolicy::try_new(nr_keys, capacity, options).unwrap();
        let mut touched = FxHashSet::default();

        for op in ops {
            apply(&mut arc, op);
            if let Op::Set(k) | Op::Get(k) = op {
                touched.insert(k);
            }

            let check = arc.check_invariants();
            prop_assert!(check.is_ok(), "{:?}", check);
            prop_assert!((arc.t1_len() + arc.t2_len()) as u64 <= capacity);
            prop_assert!((arc.t1_len() + arc.b1_len()) as u64 <= capacity);
            prop_assert!(arc.p() <= capacity);

            // Only keys the workload touched can appear in any list.
            for key in 0..nr_keys {
                if arc.list_of(key).is_some() {
                    prop_assert!(touched.contains(&key));
                }
            }
        }
    }

    /// `set` makes a key resident under LRU; under ARC it is at least tracked,
    /// since a cold admission may be demoted to B1 straight away.
    #[test]
    fn prop_set_then_tracked(
        (nr_keys, _capacity, _iom, ops) in ops_strategy(),
        key_seed in any::<u32>(),
        capacity in 1u64..24,
    ) {
        let key = key_seed % nr_keys;
        for kind in PolicyKind::ALL {
            let mut policy = build(kind, nr_keys, capacity);
            for &op in &ops {
                apply(&mut policy, op);
            }
            let was_resident = policy.contains(key);
            policy.set(key);
            match policy.as_arc() {
                Some(arc) => {
                    let list = arc.list_of(key);
                    prop_assert!(list.is_some());
                    if was_resident {
                        prop_assert_eq!(list, Some(ArcList::T2));
                    }
                    if !arc.contains(key) {
                        prop_assert_eq!(list, Some(ArcList::B1));
                    }
                },
                None => prop_assert!(policy.contains(key)),
            }
        }
    }

    /// `clean_stat` zeroes counters but never changes residency.
    #[test]
    fn prop_clean_stat_keeps_contents((nr_keys, capacity, _iom, ops) in ops_strategy()) {
        for kind in PolicyKind::ALL {
            let mut policy = build(kind, nr_keys, capacity);
            for &op in &ops {
                apply(&mut policy, op);
            }
            let before: Vec<bool> = (0..nr_keys).map(|k| policy.contains(k)).collect();
            policy.clean_stat();
            let after: Vec<bool> = (0..nr_keys).map(|k| policy.contains(k)).collect();
            prop_assert_eq!(before, after);
            prop_assert_eq!(policy.collect_stat().accesses(), 0);
        }
    }
}
