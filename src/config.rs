use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// False positive rate used when only a capacity is given.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Capacity used by `FilterConfig::default()`.
pub const DEFAULT_EXPECTED_ITEMS: u64 = 1000;

/// Target accuracy a filter is sized for.
///
/// Deserialized configs are not validated until they reach
/// [`FilterConfig::validate`], which every filter constructor calls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// n -- number of elements the filter is sized for
    pub expected_items: u64,
    /// p -- target false positive rate at `expected_items` insertions
    #[serde(default = "default_false_positive_rate")]
    pub false_positive_rate: f64,
}

fn default_false_positive_rate() -> f64 {
    DEFAULT_FALSE_POSITIVE_RATE
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expected_items: DEFAULT_EXPECTED_ITEMS,
            false_positive_rate: DEFAULT_FALSE_POSITIVE_RATE,
        }
    }
}

impl FilterConfig {
    pub fn new(expected_items: u64, false_positive_rate: f64) -> Result<Self> {
        let config = Self {
            expected_items,
            false_positive_rate,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_expected_items(expected_items: u64) -> Result<Self> {
        Self::new(expected_items, DEFAULT_FALSE_POSITIVE_RATE)
    }

    /// Checks `n > 0` and `0 < p < 1`. NaN rates are rejected.
    pub fn validate(&self) -> Result<()> {
        if self.expected_items == 0 {
            return Err(Error::invalid_configuration(
                "expected_items must be greater than 0",
            ));
        }
        let p = self.false_positive_rate;
        if !(p > 0.0 && p < 1.0) {
            return Err(Error::invalid_configuration(format!(
                "false_positive_rate must be strictly between 0 and 1, got {p}"
            )));
        }
        Ok(())
    }
}
