//! Hash families that map an item to `k` bit positions in `[0, m)`.
//!
//! Both families are built on xxh3-64 with fixed seeds, so positions are
//! identical across processes, runs and platforms. Callers hand in the
//! canonical byte encoding of their items; nothing here looks at
//! `std::hash::Hash`, whose output is not stable across releases.

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Produces the `k` positions an item occupies in a filter of `m` bits.
pub trait IndexGenerator: Send + Sync {
    /// Stable identifier written into persisted filters.
    const SCHEME_ID: u8;

    /// Yields exactly `k` positions, each in `[0, m)`. `m` must be non-zero.
    fn indices<'a>(&'a self, item: &'a [u8], k: u32, m: u64) -> impl Iterator<Item = u64> + 'a;
}

const BASE_SEED: u64 = 0;
const STEP_SEED: u64 = 64;

/// Kirsch–Mitzenmacher double hashing: `h_i = (h1 + i * h2) mod m`.
///
/// Two xxh3 computations per item regardless of `k`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DoubleHashing;

impl IndexGenerator for DoubleHashing {
    const SCHEME_ID: u8 = 1;

    fn indices<'a>(&'a self, item: &'a [u8], k: u32, m: u64) -> impl Iterator<Item = u64> + 'a {
        let m = u128::from(m);
        let hash1 = u128::from(xxh3_64_with_seed(item, BASE_SEED)) % m;
        // a zero step would collapse all k positions onto hash1
        let hash2 = (u128::from(xxh3_64_with_seed(item, STEP_SEED)) % m).max(1);
        (0..u128::from(k)).map(move |i| ((hash1 + i * hash2) % m) as u64)
    }
}

/// One independent xxh3 computation per hash function, salted by its index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeededHashing;

impl IndexGenerator for SeededHashing {
    const SCHEME_ID: u8 = 2;

    fn indices<'a>(&'a self, item: &'a [u8], k: u32, m: u64) -> impl Iterator<Item = u64> + 'a {
        (0..k).map(move |i| xxh3_64_with_seed(item, u64::from(i)) % m)
    }
}
