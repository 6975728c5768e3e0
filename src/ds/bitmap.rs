//! Dense bit-set with a live population count.
//!
//! Used once per run to count the distinct keys a trace touches; the count
//! sizes the capacity probes of the miss-ratio curve.
//!
//! ## Architecture
//!
//! ```text
//!   words: Vec<u64>                                      ones
//!   ┌──────────────────┬──────────────────┬─────────┐   ┌────┐
//!   │ bits 0..64       │ bits 64..128     │  ...    │   │ 3  │
//!   └──────────────────┴──────────────────┴─────────┘   └────┘
//!   idx >> 6 selects the word, idx & 63 the bit
//! ```
//!
//! ## Behavior
//! - `set1` / `set0` on an out-of-range index, or on a bit already at the
//!   target value, change nothing (including `count`).
//! - `count` is O(1).

use crate::error::AllocError;

/// Fixed-size bit vector plus running count of set bits.
#[derive(Debug, Clone)]
pub struct Bitmap {
    words: Vec<u64>,
    bits: u64,
    ones: u64,
}

impl Bitmap {
    /// Creates an all-zero bitmap holding `bits` bits.
    ///
    /// # Example
    ///
    /// ```
    /// use mrckit::ds::Bitmap;
    ///
    /// let mut bm = Bitmap::try_new(10).unwrap();
    /// for key in [5u64, 5, 5, 2, 9] {
    ///     bm.set1(key);
    /// }
    /// assert_eq!(bm.count(), 3);
    /// ```
    pub fn try_new(bits: u64) -> Result<Self, AllocError> {
        let nr_words = bits.div_ceil(64) as usize;
        let mut words = Vec::new();
        words
            .try_reserve_exact(nr_words)
            .map_err(|e| AllocError::from_reserve("bitmap", nr_words, e))?;
        words.resize(nr_words, 0);
        Ok(Self {
            words,
            bits,
            ones: 0,
        })
    }

    /// Returns the number of addressable bits.
    #[inline]
    pub fn len(&self) -> u64 {
        self.bits
    }

    /// Returns `true` if the bitmap has no addressable bits.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if `idx` is in range and set.
    #[inline]
    pub fn test(&self, idx: u64) -> bool {
        idx < self.bits && self.words[(idx >> 6) as usize] & Self::mask(idx) != 0
    }

    /// Sets bit `idx`; no-op when out of range or already set.
    #[inline]
    pub fn set1(&mut self, idx: u64) {
        if idx < self.bits && !self.test(idx) {
            self.words[(idx >> 6) as usize] |= Self::mask(idx);
            self.ones += 1;
        }
    }

    /// Clears bit `idx`; no-op when out of range or already clear.
    #[inline]
    pub fn set0(&mut self, idx: u64) {
        if idx < self.bits && self.test(idx) {
            self.words[(idx >> 6) as usize] &= !Self::mask(idx);
            self.ones -= 1;
        }
    }

    /// Returns the number of set bits.
    #[inline]
    pub fn count(&self) -> u64 {
        self.ones
    }

    /// Returns `true` if every addressable bit is set.
    pub fn is_all_set(&self) -> bool {
        self.ones == self.bits
    }

    /// Returns `true` if no bit is set.
    pub fn is_all_clear(&self) -> bool {
        self.ones == 0
    }

    /// Sets every addressable bit.
    pub fn set_all1(&mut self) {
        self.words.fill(u64::MAX);
        // Bits past `self.bits` in the last word stay clear so `test` and
        // `count` agree.
        let tail = self.bits & 63;
        if tail != 0
            && let Some(last) = self.words.last_mut()
        {
            *last = (1u64 << tail) - 1;
        }
        self.ones = self.bits;
    }

    /// Clears every bit.
    pub fn set_all0(&mut self) {
        self.words.fill(0);
        self.ones = 0;
    }

    #[inline(always)]
    fn mask(idx: u64) -> u64 {
        1u64 << (idx & 63)
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let actual: u64 = self.words.iter().map(|w| u64::from(w.count_ones())).sum();
        assert_eq!(actual, self.ones, "population count drifted");
        assert!(self.ones <= self.bits);
    }
}
