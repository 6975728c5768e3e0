#![no_main]

use libfuzzer_sys::fuzz_target;
use mrckit::ds::Bitmap;

// Fuzz arbitrary set1/set0/bulk sequences on Bitmap against a bool vector.
fuzz_target!(|data: &[u8]| {
    let Some((&size, ops)) = data.split_first() else {
        return;
    };
    let bits = u64::from(size) * 3;
    let Ok(mut bm) = Bitmap::try_new(bits) else {
        return;
    };
    let mut model = vec![false; bits as usize];

    for pair in ops.chunks_exact(2) {
        // Indices may land past the end on purpose.
        let idx = u64::from(pair[1]) * 3 / 2;
        match pair[0] % 4 {
            0 => {
                bm.set1(idx);
                if let Some(slot) = model.get_mut(idx as usize) {
                    *slot = true;
                }
            }
            1 => {
                bm.set0(idx);
                if let Some(slot) = model.get_mut(idx as usize) {
                    *slot = false;
                }
            }
            2 => {
                bm.set_all1();
                model.fill(true);
            }
            _ => {
                bm.set_all0();
                model.fill(false);
            }
        }
        assert_eq!(bm.test(idx), model.get(idx as usize).copied().unwrap_or(false));
        assert_eq!(bm.count(), model.iter().filter(|b| **b).count() as u64);
    }

    bm.debug_validate_invariants();
});
