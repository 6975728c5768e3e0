#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::ds::IndexList;

// Fuzz arbitrary operation sequences on IndexList
//
// First byte picks the key space; each following pair is (op, key).
// Operations: push_front, remove, move_to_front, pop_back, clear.
fuzz_target!(|data: &[u8]| {
    let Some((&size, ops)) = data.split_first() else {
        return;
    };
    let nr_keys = u32::from(size) + 1;
    let Ok(mut list) = IndexList::try_new(nr_keys) else {
        return;
    };

    for pair in ops.chunks_exact(2) {
        let key = u32::from(pair[1]) % nr_keys;
        match pair[0] % 5 {
            0 => {
                // push_front (only when not linked)
                if !list.contains(key) {
                    let old_len = list.len();
                    list.push_front(key);
                    assert_eq!(list.front(), Some(key));
                    assert_eq!(list.len(), old_len + 1);
                }
            }
            1 => {
                // remove
                let was = list.contains(key);
                let old_len = list.len();
                assert_eq!(list.remove(key), was);
                assert!(!list.contains(key));
                assert_eq!(list.len(), old_len - usize::from(was));
            }
            2 => {
                // move_to_front
                let was = list.contains(key);
                assert_eq!(list.move_to_front(key), was);
                if was {
                    assert_eq!(list.front(), Some(key));
                }
            }
            3 => {
                // pop_back
                let back = list.back();
                assert_eq!(list.pop_back(), back);
                if let Some(k) = back {
                    assert!(!list.contains(k));
                }
            }
            _ => {
                list.clear();
                assert!(list.is_empty());
            }
        }
        assert!(list.len() <= nr_keys as usize);
    }

    list.check_invariants().unwrap();
    assert_eq!(list.iter().count(), list.len());
});
