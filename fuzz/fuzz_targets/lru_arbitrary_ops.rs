#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::policy::lru::LruPolicy;
use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

// Fuzz arbitrary set/get/delete/clean_stat sequences on LruPolicy.
//
// Header bytes: key space, capacity, insert-on-miss flag.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let nr_keys = u32::from(data[0]) + 1;
    let capacity = u64::from(data[1] % 64);
    let options = PolicyOptions {
        insert_on_miss: data[2] & 1 == 1,
    };
    let Ok(mut lru) = LruPolicy::try_new(nr_keys, capacity, options) else {
        return;
    };

    for pair in data[3..].chunks_exact(2) {
        let key = u32::from(pair[1]) % nr_keys;
        match pair[0] % 4 {
            0 => {
                lru.set(key);
                assert!(capacity == 0 || lru.contains(key));
            }
            1 => {
                let was = lru.contains(key);
                assert_eq!(lru.get(key), was);
            }
            2 => {
                let was = lru.contains(key);
                assert_eq!(lru.delete(key), was);
                assert!(!lru.contains(key));
            }
            _ => {
                lru.clean_stat();
                assert_eq!(lru.collect_stat().accesses(), 0);
            }
        }
        assert!(lru.len() as u64 <= capacity);
    }

    lru.check_invariants().unwrap();
});
