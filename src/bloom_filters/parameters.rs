use std::f64::consts::LN_2;

use crate::config::FilterConfig;
use crate::error::Result;

/// Bit-array length and hash count derived from a [`FilterConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parameters {
    /// number of bits in a Bloom filter
    pub m: u64,
    /// number of hash functions
    pub k: u32,
}

impl Parameters {
    /// n -- number of elements to insert
    /// p -- the false positive rate
    pub fn compute(n: u64, p: f64) -> Result<Self> {
        Self::for_config(&FilterConfig::new(n, p)?)
    }

    pub fn for_config(config: &FilterConfig) -> Result<Self> {
        config.validate()?;
        let m = calculate_m(config.false_positive_rate, config.expected_items);
        Ok(Self {
            m,
            k: calculate_k(m, config.expected_items),
        })
    }
}

// m = ceil(-(n * ln ε) / (ln2)^2) where ε is desired false positive probability,
// in our case it is indicated by the letter p
fn calculate_m(p: f64, n: u64) -> u64 {
    (-(n as f64) * p.ln() / LN_2.powi(2)).ceil().max(1.0) as u64
}

// k = max(1, round(m/n * ln2))
fn calculate_k(m: u64, n: u64) -> u32 {
    ((m as f64 / n as f64) * LN_2).round().max(1.0) as u32
}

/// (1 - e^(-k*n/m))^k for `n` insertions into `m` bits with `k` hashes.
pub fn estimate_false_positive_rate(m: u64, k: u32, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let k = f64::from(k);
    let exponent = -k * n as f64 / m as f64;
    (1.0 - exponent.exp()).powf(k)
}
