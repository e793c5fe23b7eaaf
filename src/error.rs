//! Error types for the membership index

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected construction parameters. Never produced after a filter exists.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A persisted blob could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("cannot allocate a bit store of {bits} bits")]
    AllocationFailure { bits: u64 },

    /// A bit position at or past the end of the store.
    #[error("bit index {index} out of range for a store of {len} bits")]
    IndexOutOfRange { index: u64, len: u64 },
}

impl Error {
    pub(crate) fn invalid_configuration(msg: impl Into<String>) -> Self {
        Error::InvalidConfiguration(msg.into())
    }

    pub(crate) fn serialization(msg: impl Into<String>) -> Self {
        Error::Serialization(msg.into())
    }

    pub(crate) fn insufficient_data(field: &'static str) -> Self {
        Error::Serialization(format!("insufficient data reading {field}"))
    }
}
