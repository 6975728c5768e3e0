#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::policy::arc::ArcPolicy;
use mrckit::traits::{PolicyOptions, ReadOnlyPolicy, ReplacementPolicy};

// Fuzz arbitrary set/get/delete sequences on ArcPolicy, auditing the four
// lists after every step.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }
    let nr_keys = u32::from(data[0]) + 1;
    let capacity = u64::from(data[1] % 32);
    let options = PolicyOptions {
        insert_on_miss: data[2] & 1 == 1,
    };
    let Ok(mut arc) = ArcPolicy::try_new(nr_keys, capacity, options) else {
        return;
    };

    for pair in data[3..].chunks_exact(2) {
        let key = u32::from(pair[1]) % nr_keys;
        match pair[0] % 3 {
            0 => arc.set(key),
            1 => {
                let was = arc.contains(key);
                assert_eq!(arc.get(key), was);
            }
            _ => {
                let ghost = arc.list_of(key).filter(|l| !l.is_resident());
                arc.delete(key);
                assert!(!arc.contains(key));
                assert_eq!(arc.list_of(key).filter(|l| !l.is_resident()), ghost);
            }
        }
        if let Err(err) = arc.check_invariants() {
            panic!("{err}");
        }
    }
});
