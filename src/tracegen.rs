//! Synthetic trace generation.
//!
//! Keys are the scaled product of three bounded draws,
//! `(r1 % 103) * (r2 % 107) * (r3 % 111) / 10000`, which skews heavily toward
//! small keys. A trailing sentinel `max + 1` closes the trace so it can be
//! replayed directly.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates `count` keys from `seed`, followed by the sentinel.
///
/// # Example
///
/// ```
/// use mrckit::tracegen::generate;
///
/// let trace = generate(1_000, 7);
/// assert_eq!(trace.len(), 1_001);
/// let sentinel = *trace.last().unwrap();
/// assert!(trace[..1_000].iter().all(|&k| k < sentinel));
/// assert_eq!(trace, generate(1_000, 7));
/// ```
pub fn generate(count: usize, seed: u64) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys = Vec::with_capacity(count + 1);
    let mut max = 0u32;
    for _ in 0..count {
        let a = rng.r#gen::<u32>() % 103;
        let b = rng.r#gen::<u32>() % 107;
        let c = rng.r#gen::<u32>() % 111;
        let key = a * b * c / 10_000;
        max = max.max(key);
        keys.push(key);
    }
    keys.push(max + 1);
    keys
}

/// Writes `keys` as little-endian `u32`s.
pub fn write_trace<W: Write>(out: &mut W, keys: &[u32]) -> io::Result<()> {
    for key in keys {
        out.write_all(&key.to_le_bytes())?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Trace;

    #[test]
    fn keys_stay_below_product_bound() {
        let keys = generate(5_000, 1);
        // 102 * 106 * 110 / 10000 = 118
        assert!(keys[..5_000].iter().all(|&k| k <= 118));
    }

    #[test]
    fn sentinel_is_max_plus_one() {
        let keys = generate(2_000, 3);
        let max = keys[..2_000].iter().copied().max().unwrap();
        assert_eq!(*keys.last().unwrap(), max + 1);
    }

    #[test]
    fn empty_generation_has_sentinel_one() {
        assert_eq!(generate(0, 9), vec![1]);
    }

    #[test]
    fn seeds_differ() {
        assert_ne!(generate(100, 1), generate(100, 2));
    }

    #[test]
    fn written_trace_reads_back() {
        let keys = generate(300, 11);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write_trace(&mut file, &keys).unwrap();

        let trace = Trace::open(file.path()).unwrap();
        assert_eq!(trace.iter().collect::<Vec<_>>(), keys);
        assert_eq!(trace.nr_keys(), *keys.last().unwrap());
    }
}
