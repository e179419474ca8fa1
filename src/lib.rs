#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]

mod oracle;
pub use oracle::*;

mod exact;
pub use exact::*;

mod probabilistic;
pub use probabilistic::*;

mod error;
pub use error::*;

mod common;
pub use common::{ExpectedCardinality, FalsePositiveTarget, SeenId, ShardCount};

mod hashing;

#[cfg(test)]
mod tests;
