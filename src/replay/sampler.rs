//! Hash-based whole-key sampling.
//!
//! Each key hashes to a fixed point in `[0, 1)`; a key is sampled iff that
//! point lies in `[lb, ub)`. Every occurrence of a key therefore gets the
//! same decision, and a window of width `rate` keeps roughly `rate` of the
//! distinct keys.

use xxhash_rust::xxh64::xxh64;

const HASH_SEED: u64 = 0;

/// 2^-53: spacing of the 53-bit mantissa grid in `[0, 1)`.
const UNIT: f64 = 1.0 / (1u64 << 53) as f64;

/// Inclusion window `[lb, ub)` over the unit interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    lb: f64,
    ub: f64,
}

impl Sampler {
    /// Window `[0, rate)`. A rate of `1.0` includes every key.
    ///
    /// # Example
    ///
    /// ```
    /// use mrckit::replay::Sampler;
    ///
    /// let all = Sampler::new(1.0);
    /// assert!((0..1000).all(|k| all.includes(k)));
    ///
    /// let half = Sampler::new(0.5);
    /// assert_eq!(half.includes(42), half.includes(42));
    /// ```
    pub fn new(rate: f64) -> Self {
        Self { lb: 0.0, ub: rate }
    }

    pub fn lower_bound(&self) -> f64 {
        self.lb
    }

    pub fn upper_bound(&self) -> f64 {
        self.ub
    }

    /// Width of the window.
    pub fn rate(&self) -> f64 {
        self.ub - self.lb
    }

    /// Maps `key` to its fixed point in `[0, 1)`.
    #[inline]
    pub fn fraction(key: u32) -> f64 {
        let hash = xxh64(&key.to_le_bytes(), HASH_SEED);
        (hash >> 11) as f64 * UNIT
    }

    /// Returns `true` if `key` falls inside the window.
    #[inline]
    pub fn includes(&self, key: u32) -> bool {
        let r = Self::fraction(key);
        r >= self.lb && r < self.ub
    }
}
