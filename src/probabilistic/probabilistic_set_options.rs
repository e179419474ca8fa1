use crate::{ExpectedCardinality, FalsePositiveTarget, ShardCount};

/// Configuration for [`ShardedBloomFilter`](crate::ShardedBloomFilter).
#[derive(Clone, Debug)]
pub struct ProbabilisticSetOptions {
    /// Distinct ids the filter must hold while staying under the target rate.
    pub expected_cardinality: ExpectedCardinality,
    /// False-positive ceiling at `expected_cardinality` ids.
    pub false_positive_target: FalsePositiveTarget,
    /// Number of independent bit-array segments.
    pub shard_count: ShardCount,
}

impl ProbabilisticSetOptions {
    /// Options for `expected_cardinality` ids with the default target and shard count.
    pub fn new(expected_cardinality: ExpectedCardinality) -> Self {
        Self {
            expected_cardinality,
            false_positive_target: FalsePositiveTarget::default(),
            shard_count: ShardCount::default(),
        }
    }
}
