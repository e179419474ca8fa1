use std::{num::NonZeroUsize, ops::Deref, thread};

use crate::FirstSeenError;

/// A validated identifier.
///
/// Ids are non-negative integers. Construct one from a signed value with
/// [`SeenId::try_from`], which rejects negatives with
/// [`FirstSeenError::InvalidArgument`]; unsigned values convert infallibly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeenId(u64);

impl SeenId {
    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl Deref for SeenId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<i64> for SeenId {
    type Error = FirstSeenError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| FirstSeenError::InvalidArgument(value))
    }
}

impl TryFrom<i32> for SeenId {
    type Error = FirstSeenError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<u64> for SeenId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<u32> for SeenId {
    fn from(value: u32) -> Self {
        Self(u64::from(value))
    }
}

/// Number of distinct ids a probabilistic filter is sized for.
///
/// Must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExpectedCardinality(u64);

impl Deref for ExpectedCardinality {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for ExpectedCardinality {
    type Error = FirstSeenError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(FirstSeenError::InvalidExpectedCardinality(
                "Expected cardinality must be at least 1".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Target false-positive probability for a probabilistic filter.
///
/// Must be finite and in the open interval `(0, 0.01)`. Defaults to `0.001`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct FalsePositiveTarget(f64);

impl FalsePositiveTarget {
    /// Upper bound (exclusive) accepted for a target.
    pub const CEILING: f64 = 0.01;
}

impl Default for FalsePositiveTarget {
    fn default() -> Self {
        Self(0.001)
    }
}

impl Deref for FalsePositiveTarget {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<f64> for FalsePositiveTarget {
    type Error = FirstSeenError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value <= 0f64 {
            Err(FirstSeenError::InvalidFalsePositiveTarget(
                "False positive target must be greater than 0".to_string(),
            ))
        } else if value >= Self::CEILING {
            Err(FirstSeenError::InvalidFalsePositiveTarget(
                "False positive target must be less than 0.01".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}

/// Number of independent shards the shared state is split into.
///
/// Must be a power of two between 2 and 65536. The default scales with the
/// available parallelism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShardCount(usize);

impl ShardCount {
    /// Largest accepted shard count.
    pub const MAX: usize = 1 << 16;
}

impl Default for ShardCount {
    fn default() -> Self {
        let parallelism = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);

        Self((parallelism * 4).next_power_of_two().clamp(2, Self::MAX))
    }
}

impl Deref for ShardCount {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<usize> for ShardCount {
    type Error = FirstSeenError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value < 2 {
            Err(FirstSeenError::InvalidShardCount(
                "Shard count must be at least 2".to_string(),
            ))
        } else if value > Self::MAX {
            Err(FirstSeenError::InvalidShardCount(format!(
                "Shard count must be at most {}",
                Self::MAX
            )))
        } else if !value.is_power_of_two() {
            Err(FirstSeenError::InvalidShardCount(
                "Shard count must be a power of two".to_string(),
            ))
        } else {
            Ok(Self(value))
        }
    }
}
