use std::sync::atomic::{AtomicU64, Ordering};

use bit_vec::BitVec;

use crate::error::{Error, Result};

const WORD_BITS: u64 = u64::BITS as u64;

/// Fixed-length bit array packed into atomic 64-bit words.
///
/// Bits only ever go from 0 to 1. Setting is a single `fetch_or` on the
/// containing word, so concurrent writers touching the same word never
/// lose each other's bits.
pub struct AtomicBitStore {
    words: Box<[AtomicU64]>,
    len: u64,
}

impl AtomicBitStore {
    /// Allocates `len` zeroed bits.
    pub fn with_len(len: u64) -> Result<Self> {
        let alloc_failure = || Error::AllocationFailure { bits: len };
        let num_words = usize::try_from(len.div_ceil(WORD_BITS)).map_err(|_| alloc_failure())?;

        let mut words = Vec::new();
        words
            .try_reserve_exact(num_words)
            .map_err(|_| alloc_failure())?;
        words.extend((0..num_words).map(|_| AtomicU64::new(0)));

        Ok(Self {
            words: words.into_boxed_slice(),
            len,
        })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sets bit `idx`, returning whether it was previously unset.
    pub fn set(&self, idx: u64) -> Result<bool> {
        let (word, mask) = self.locate(idx)?;
        let previous = self.words[word].fetch_or(mask, Ordering::AcqRel);
        Ok(previous & mask == 0)
    }

    /// Out-of-range positions are a caller bug: they panic in debug builds
    /// and read as unset in release builds.
    pub fn test(&self, idx: u64) -> bool {
        debug_assert!(
            idx < self.len,
            "bit index {idx} out of range for a store of {} bits",
            self.len
        );
        match self.locate(idx) {
            Ok((word, mask)) => self.words[word].load(Ordering::Acquire) & mask != 0,
            Err(_) => false,
        }
    }

    pub fn population_count(&self) -> u64 {
        self.words
            .iter()
            .map(|word| u64::from(word.load(Ordering::Acquire).count_ones()))
            .sum()
    }

    /// Copies the current bits into a [`BitVec`] of the same length.
    pub fn snapshot(&self) -> BitVec {
        let mut bits = BitVec::from_elem(self.len as usize, false);
        for (word_idx, word) in self.words.iter().enumerate() {
            let mut value = word.load(Ordering::Acquire);
            while value != 0 {
                let bit = value.trailing_zeros() as usize;
                bits.set(word_idx * WORD_BITS as usize + bit, true);
                value &= value - 1;
            }
        }
        bits
    }

    /// Builds a store holding exactly the bits of `bits`.
    pub fn from_bit_vec(bits: &BitVec) -> Result<Self> {
        let store = Self::with_len(bits.len() as u64)?;
        for (idx, bit) in bits.iter().enumerate() {
            if bit {
                store.set(idx as u64)?;
            }
        }
        Ok(store)
    }

    fn locate(&self, idx: u64) -> Result<(usize, u64)> {
        if idx >= self.len {
            return Err(Error::IndexOutOfRange {
                index: idx,
                len: self.len,
            });
        }
        Ok(((idx / WORD_BITS) as usize, 1u64 << (idx % WORD_BITS)))
    }
}

impl std::fmt::Debug for AtomicBitStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomicBitStore")
            .field("len", &self.len)
            .field("population_count", &self.population_count())
            .finish()
    }
}
