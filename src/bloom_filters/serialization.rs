//! Persisted filter layout.
//!
//! ```text
//! offset  size  field
//!      0     4  magic "BLMF"
//!      4     1  format version
//!      5     1  hash scheme id
//!      6     8  m, bits (u64)
//!     14     4  k (u32)
//!     18     8  items inserted (u64)
//!     26     8  target false positive rate (f64)
//!     34     8  expected items (u64)
//!     42        ceil(m / 8) bytes of bits, most significant bit first
//! ```
//!
//! All integers are little-endian.

use bit_vec::BitVec;
use tracing::{debug, warn};

use crate::bloom_filters::bit_store::AtomicBitStore;
use crate::bloom_filters::filter::BloomFilter;
use crate::bloom_filters::hashing::IndexGenerator;
use crate::bloom_filters::parameters::Parameters;
use crate::codec::{FilterBytes, FilterSlice};
use crate::config::FilterConfig;
use crate::error::{Error, Result};

pub const MAGIC: [u8; 4] = *b"BLMF";
pub const FORMAT_VERSION: u8 = 1;
pub const HEADER_LEN: usize = 42;

impl<H: IndexGenerator> BloomFilter<H> {
    /// Serializes the configuration, counters and bit array.
    ///
    /// Bits set by `add` calls racing with this one may or may not be
    /// included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = self.bits().to_bytes();
        let mut bytes = FilterBytes::with_capacity(HEADER_LEN + payload.len());

        bytes.write(&MAGIC);
        bytes.write_u8(FORMAT_VERSION);
        bytes.write_u8(H::SCHEME_ID);
        bytes.write_u64_le(self.size());
        bytes.write_u32_le(self.hash_count());
        bytes.write_u64_le(self.item_count());
        bytes.write_f64_le(self.config.false_positive_rate);
        bytes.write_u64_le(self.config.expected_items);
        bytes.write(&payload);

        debug!(
            m = self.size(),
            items = self.item_count(),
            len = HEADER_LEN + payload.len(),
            "serialized bloom filter"
        );
        bytes.into_bytes()
    }
}

impl<H: IndexGenerator + Default> BloomFilter<H> {
    /// Restores a filter written by [`BloomFilter::to_bytes`] with the same
    /// hashing scheme.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes).inspect_err(|err| {
            warn!(%err, len = bytes.len(), "rejected persisted bloom filter");
        })
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = FilterSlice::new(bytes);

        let magic: [u8; 4] = cursor
            .read_array()
            .map_err(|_| Error::insufficient_data("magic"))?;
        if magic != MAGIC {
            return Err(Error::serialization(format!(
                "bad magic: expected {MAGIC:02x?}, got {magic:02x?}"
            )));
        }

        let version = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("format version"))?;
        if version != FORMAT_VERSION {
            return Err(Error::serialization(format!(
                "unsupported format version: expected {FORMAT_VERSION}, got {version}"
            )));
        }

        let scheme = cursor
            .read_u8()
            .map_err(|_| Error::insufficient_data("hash scheme"))?;
        if scheme != H::SCHEME_ID {
            return Err(Error::serialization(format!(
                "hash scheme mismatch: expected {}, got {scheme}",
                H::SCHEME_ID
            )));
        }

        let m = cursor
            .read_u64_le()
            .map_err(|_| Error::insufficient_data("m"))?;
        let k = cursor
            .read_u32_le()
            .map_err(|_| Error::insufficient_data("k"))?;
        let n_inserted = cursor
            .read_u64_le()
            .map_err(|_| Error::insufficient_data("item count"))?;
        let false_positive_rate = cursor
            .read_f64_le()
            .map_err(|_| Error::insufficient_data("false positive rate"))?;
        let expected_items = cursor
            .read_u64_le()
            .map_err(|_| Error::insufficient_data("expected items"))?;

        let config = FilterConfig {
            expected_items,
            false_positive_rate,
        };
        let params = Parameters::for_config(&config)
            .map_err(|err| Error::serialization(format!("invalid stored configuration: {err}")))?;
        // m and k are a pure function of the stored configuration
        if params != (Parameters { m, k }) {
            return Err(Error::serialization(format!(
                "m/k inconsistent with stored configuration: got m = {m}, k = {k}, \
                 expected m = {}, k = {}",
                params.m, params.k
            )));
        }

        let payload = cursor.remaining();
        let expected_len = m.div_ceil(8);
        if payload.len() as u64 != expected_len {
            return Err(Error::serialization(format!(
                "payload length mismatch: m = {m} needs {expected_len} bytes, got {}",
                payload.len()
            )));
        }

        let tail_bits = m % 8;
        if tail_bits != 0 {
            let padding = payload[payload.len() - 1] & (0xFF >> tail_bits);
            if padding != 0 {
                return Err(Error::serialization("non-zero padding bits after m"));
            }
        }

        let mut bits = BitVec::from_bytes(payload);
        bits.truncate(m as usize);
        let store = AtomicBitStore::from_bit_vec(&bits)?;

        debug!(m, k, items = n_inserted, "deserialized bloom filter");
        Ok(Self::from_parts(
            config,
            params,
            store,
            n_inserted,
            H::default(),
        ))
    }
}
