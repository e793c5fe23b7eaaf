use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bit_vec::BitVec;
use tracing::{debug, warn};

use crate::bloom_filters::bit_store::AtomicBitStore;
use crate::bloom_filters::hashing::{DoubleHashing, IndexGenerator};
use crate::bloom_filters::parameters::{estimate_false_positive_rate, Parameters};
use crate::config::FilterConfig;
use crate::error::Result;

/// Whether anything has been added yet. There is no way back to `Configured`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterState {
    Configured,
    Populated,
}

/// A Bloom filter answering "definitely absent" or "probably present".
///
/// `m` and `k` are fixed at construction from the configured capacity and
/// target rate. `add` and `contains` take `&self`: bits are set with atomic
/// word operations and the item counter is atomic, so a filter can be shared
/// between threads behind an `Arc` without a lock.
///
/// Items are opaque byte strings; callers supply a canonical encoding.
#[derive(Debug)]
pub struct BloomFilter<H = DoubleHashing> {
    pub(super) config: FilterConfig,
    pub(super) params: Parameters,
    pub(super) bits: AtomicBitStore,
    pub(super) n_inserted: AtomicU64,
    pub(super) hasher: H,
}

impl BloomFilter {
    /// n -- number of elements to insert
    /// p -- the false positive rate
    pub fn new(expected_items: u64, false_positive_rate: f64) -> Result<Self> {
        Self::from_config(FilterConfig::new(expected_items, false_positive_rate)?)
    }

    pub fn from_config(config: FilterConfig) -> Result<Self> {
        Self::with_index_generator(config, DoubleHashing)
    }
}

impl<H: IndexGenerator> BloomFilter<H> {
    pub fn with_index_generator(config: FilterConfig, hasher: H) -> Result<Self> {
        let params = Parameters::for_config(&config)?;
        let bits = AtomicBitStore::with_len(params.m)?;
        debug!(
            expected_items = config.expected_items,
            false_positive_rate = config.false_positive_rate,
            m = params.m,
            k = params.k,
            scheme = H::SCHEME_ID,
            "constructed bloom filter"
        );
        Ok(Self::from_parts(config, params, bits, 0, hasher))
    }

    pub(super) fn from_parts(
        config: FilterConfig,
        params: Parameters,
        bits: AtomicBitStore,
        n_inserted: u64,
        hasher: H,
    ) -> Self {
        Self {
            config,
            params,
            bits,
            n_inserted: AtomicU64::new(n_inserted),
            hasher,
        }
    }

    pub fn add(&self, item: &[u8]) {
        for idx in self.hasher.indices(item, self.params.k, self.params.m) {
            if let Err(err) = self.bits.set(idx) {
                unreachable!("index generator left [0, m): {err}");
            }
        }

        let previous = self.n_inserted.fetch_add(1, Ordering::AcqRel);
        if previous == self.config.expected_items {
            warn!(
                expected_items = self.config.expected_items,
                estimated_false_positive_rate = self.estimated_false_positive_rate(),
                "bloom filter exceeded its configured capacity"
            );
        }
    }

    /// `false` means the item was never added. `true` may be a false positive.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.hasher
            .indices(item, self.params.k, self.params.m)
            .all(|idx| self.bits.test(idx))
    }

    /// (1 - e^(-k*n/m))^k for the current item count.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        estimate_false_positive_rate(self.params.m, self.params.k, self.item_count())
    }

    /// Fraction of bits set.
    pub fn fill_ratio(&self) -> f64 {
        self.bits.population_count() as f64 / self.params.m as f64
    }

    /// m, in bits
    pub fn size(&self) -> u64 {
        self.params.m
    }

    /// k
    pub fn hash_count(&self) -> u32 {
        self.params.k
    }

    /// Number of `add` calls, including repeated items.
    pub fn item_count(&self) -> u64 {
        self.n_inserted.load(Ordering::Acquire)
    }

    pub fn expected_items(&self) -> u64 {
        self.config.expected_items
    }

    /// The configured target, not the current estimate.
    pub fn false_positive_rate(&self) -> f64 {
        self.config.false_positive_rate
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Bytes needed for the packed bit array.
    pub fn size_in_bytes(&self) -> u64 {
        self.params.m.div_ceil(8)
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn state(&self) -> FilterState {
        if self.is_empty() {
            FilterState::Configured
        } else {
            FilterState::Populated
        }
    }

    /// Copy of the bit array, bit `i` at position `i`.
    pub fn bits(&self) -> BitVec {
        self.bits.snapshot()
    }
}

impl<H: IndexGenerator> fmt::Display for BloomFilter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BloomFilter(size={}, hashes={}, items={}, fill={:.1}%)",
            self.size(),
            self.hash_count(),
            self.item_count(),
            self.fill_ratio() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom_filters::hashing::SeededHashing;
    use crate::error::Error;
    use rand::distributions::Uniform;
    use rand::{thread_rng, Rng};
    use std::collections::HashSet;

    #[test]
    fn simple_check() {
        let bf = BloomFilter::new(10, 0.01).unwrap();
        bf.add(&1u32.to_be_bytes());
        bf.add(&10u32.to_be_bytes());
        bf.add(&30u32.to_be_bytes());

        let res = bf.contains(&1u32.to_be_bytes());
        assert!(res, "stored value is not found!");

        let res = bf.contains(&10u32.to_be_bytes());
        assert!(res, "stored value is not found!");

        let res = bf.contains(&30u32.to_be_bytes());
        assert!(res, "stored value is not found!");

        let res = bf.contains(&45u32.to_be_bytes());
        assert!(!res, "not stored value is found!");
    }

    #[test]
    fn sized_from_configuration() {
        let bf = BloomFilter::new(1000, 0.01).unwrap();
        assert_eq!(bf.size(), 9586);
        assert_eq!(bf.hash_count(), 7);
        assert_eq!(bf.item_count(), 0);
        assert_eq!(bf.size_in_bytes(), 1199);
        assert_eq!(bf.expected_items(), 1000);
        assert_eq!(bf.false_positive_rate(), 0.01);
    }

    #[test]
    fn rejects_invalid_configuration() {
        for (n, p) in [(0, 0.01), (1000, 0.0), (1000, 1.0)] {
            assert!(matches!(
                BloomFilter::new(n, p),
                Err(Error::InvalidConfiguration(_))
            ));
        }
        let config = FilterConfig {
            expected_items: 10,
            false_positive_rate: 2.0,
        };
        assert!(matches!(
            BloomFilter::from_config(config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn empty_filter_contains_nothing() {
        let bf = BloomFilter::new(1000, 0.01).unwrap();
        assert_eq!(bf.state(), FilterState::Configured);
        assert!(bf.is_empty());
        assert_eq!(bf.fill_ratio(), 0.0);
        assert_eq!(bf.estimated_false_positive_rate(), 0.0);
        for i in 0u32..10_000 {
            assert!(!bf.contains(&i.to_le_bytes()));
        }
        assert!(!bf.contains(b""));
    }

    #[test]
    fn no_false_negatives_after_further_adds() {
        let bf = BloomFilter::new(2000, 0.01).unwrap();
        let words: Vec<String> = (0..2000).map(|i| format!("word_{i}")).collect();
        for (i, word) in words.iter().enumerate() {
            bf.add(word.as_bytes());
            assert!(bf.contains(word.as_bytes()));
            // earlier items stay present
            assert!(bf.contains(words[i / 2].as_bytes()));
        }
        assert!(words.iter().all(|w| bf.contains(w.as_bytes())));
        assert_eq!(bf.item_count(), 2000);
        assert_eq!(bf.state(), FilterState::Populated);
    }

    #[test]
    fn repeated_items_count_but_set_no_new_bits() {
        let bf = BloomFilter::new(100, 0.01).unwrap();
        bf.add(b"same");
        let fill = bf.fill_ratio();
        bf.add(b"same");
        assert_eq!(bf.fill_ratio(), fill);
        assert_eq!(bf.item_count(), 2);
    }

    #[test]
    fn estimate_grows_with_item_count() {
        let bf = BloomFilter::new(500, 0.01).unwrap();
        let mut last = bf.estimated_false_positive_rate();
        for i in 0u32..1500 {
            bf.add(&i.to_be_bytes());
            let estimate = bf.estimated_false_positive_rate();
            assert!(estimate >= last);
            assert!(estimate <= 1.0);
            last = estimate;
        }
        assert!(last > 0.01, "overfilled filter should exceed its target");
    }

    #[test]
    fn fill_ratio_tracks_bits() {
        let bf = BloomFilter::new(1000, 0.01).unwrap();
        for i in 0u32..1000 {
            bf.add(&i.to_be_bytes());
        }
        // about half the bits are set at capacity with optimal k
        let fill = bf.fill_ratio();
        assert!(fill > 0.4 && fill < 0.6, "fill ratio {fill}");
        let ones = bf.bits().iter().filter(|&b| b).count() as f64;
        assert_eq!(ones / bf.size() as f64, fill);
    }

    #[test]
    fn identical_inputs_give_identical_bits() {
        let a = BloomFilter::new(1000, 0.01).unwrap();
        let b = BloomFilter::new(1000, 0.01).unwrap();
        for i in 0u32..700 {
            a.add(format!("item-{i}").as_bytes());
            b.add(format!("item-{i}").as_bytes());
        }
        assert_eq!(a.bits(), b.bits());
        for i in 0u32..2000 {
            let query = format!("item-{i}");
            assert_eq!(a.contains(query.as_bytes()), b.contains(query.as_bytes()));
        }
    }

    #[test]
    fn seeded_hashing_behaves_the_same() {
        let config = FilterConfig::new(1000, 0.01).unwrap();
        let bf = BloomFilter::with_index_generator(config, SeededHashing).unwrap();
        for i in 0u32..1000 {
            bf.add(&i.to_be_bytes());
        }
        assert!((0u32..1000).all(|i| bf.contains(&i.to_be_bytes())));
        let false_positive = (1000u32..11_000)
            .filter(|i| bf.contains(&i.to_be_bytes()))
            .count();
        assert!(false_positive < 300, "{false_positive} false positives");
    }

    #[test]
    fn display_reports_fill() {
        let bf = BloomFilter::new(1000, 0.01).unwrap();
        assert_eq!(
            bf.to_string(),
            "BloomFilter(size=9586, hashes=7, items=0, fill=0.0%)"
        );
        bf.add(b"x");
        assert!(bf.to_string().starts_with("BloomFilter(size=9586, hashes=7, items=1, fill=0."));
    }

    #[test]
    fn shared_between_threads() {
        let bf = BloomFilter::new(40_000, 0.01).unwrap();
        std::thread::scope(|s| {
            for tid in 0u64..4 {
                let bf = &bf;
                s.spawn(move || {
                    for i in (tid * 10_000)..((tid + 1) * 10_000) {
                        bf.add(&i.to_le_bytes());
                    }
                });
            }
        });
        assert_eq!(bf.item_count(), 40_000);
        assert!((0u64..40_000).all(|i| bf.contains(&i.to_le_bytes())));
    }

    #[test]
    fn loose_rate_tracks_its_estimate() {
        // k = 3 here, far from the k = 7 used by the one percent scenarios
        let bf = BloomFilter::new(20_000, 0.1).unwrap();
        assert_eq!(bf.hash_count(), 3);

        let mut rng = thread_rng();
        let distribution = Uniform::new_inclusive(0, 10u64.pow(12));
        let mut inserted = HashSet::new();
        while inserted.len() < 20_000 {
            let value = rng.sample(distribution).to_be_bytes();
            if inserted.insert(value) {
                bf.add(&value);
            }
        }

        let queries = 20_000;
        let mut false_positive = 0;
        let mut queried = 0;
        while queried < queries {
            let value = rng.sample(distribution).to_be_bytes();
            if inserted.contains(&value) {
                continue;
            }
            queried += 1;
            if bf.contains(&value) {
                false_positive += 1;
            }
        }

        let observed = false_positive as f64 / queries as f64;
        let estimate = bf.estimated_false_positive_rate();
        assert!(
            (observed - estimate).abs() < 0.02,
            "observed {observed}, estimated {estimate}"
        );
    }
}
