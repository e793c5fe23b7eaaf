//! A probabilistic set-membership index.
//!
//! A [`BloomFilter`] answers "definitely absent" or "probably present" for
//! byte-string items using a fixed number of bits, sized from an expected
//! item count and a target false positive rate. It never reports an added
//! item as absent, and it cannot forget items.
//!
//! ```
//! use bloom_index::BloomFilter;
//!
//! let filter = BloomFilter::new(1000, 0.01)?;
//! filter.add(b"apple");
//! assert!(filter.contains(b"apple"));
//! assert!(!filter.contains(b"grape"));
//!
//! let restored: BloomFilter = BloomFilter::from_bytes(&filter.to_bytes())?;
//! assert!(restored.contains(b"apple"));
//! # Ok::<(), bloom_index::Error>(())
//! ```

pub mod bloom_filters;
mod codec;
pub mod config;
pub mod error;

pub use bloom_filters::{BloomFilter, DoubleHashing, FilterState, IndexGenerator, SeededHashing};
pub use config::FilterConfig;
pub use error::{Error, Result};
