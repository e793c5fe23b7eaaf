mod bit_store;
mod filter;
mod hashing;
mod parameters;
mod serialization;

pub use self::bit_store::AtomicBitStore;
pub use self::filter::{BloomFilter, FilterState};
pub use self::hashing::{DoubleHashing, IndexGenerator, SeededHashing};
pub use self::parameters::{estimate_false_positive_rate, Parameters};
pub use self::serialization::{FORMAT_VERSION, HEADER_LEN, MAGIC};
