//! Exact strategy.
//!
//! Every distinct id is stored in a sharded concurrent hash set
//! ([`DashMap`](dashmap::DashMap) with unit values). No false positives; memory
//! grows with the number of distinct ids for the lifetime of the set.
//!
//! # Key Characteristics
//!
//! - **Exact:** a new id is always reported as new
//! - **Fine-grained locking:** one shard write lock per call
//! - **Unbounded growth:** ids are never removed

mod exact_seen_set;
pub use exact_seen_set::*;
