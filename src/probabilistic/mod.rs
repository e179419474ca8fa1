//! Bounded-memory strategy.
//!
//! A sharded blocked bloom filter over [`AtomicU64`](std::sync::atomic::AtomicU64)
//! words. Memory is fixed at construction; the price is a false-positive rate
//! (new ids reported as duplicates) kept below the configured target while the
//! number of distinct ids stays within the expected cardinality.
//!
//! # Key Characteristics
//!
//! - **Lock-free:** one `fetch_or` per call, no locks
//! - **Never a false negative:** a marked id is never reported as new again
//! - **Fixed memory:** roughly 10-20 bits per expected id depending on the target
//! - **Monotonic:** bits are never cleared; the false-positive rate only rises
//!
//! # When to Use
//!
//! ✅ **Use the probabilistic strategy when:**
//! - The number of distinct ids is large and memory matters
//! - An occasional new id reported as a duplicate is acceptable
//! - An upper bound on distinct ids is known
//!
//! ❌ **Use the exact strategy instead when:**
//! - Every new id must be admitted
//! - The distinct-id count is unknown or unbounded

pub(crate) mod bloom_sizing;
pub use bloom_sizing::{BloomSizing, MAX_HASH_COUNT};

mod sharded_bloom_filter;
pub use sharded_bloom_filter::*;

mod probabilistic_set_options;
pub use probabilistic_set_options::*;
