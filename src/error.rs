/// Error type for this crate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FirstSeenError {
    /// The id passed to a check was negative. The call had no effect on state.
    #[error("invalid argument: id must be non-negative, got {0}")]
    InvalidArgument(i64),

    /// Expected cardinality rejected at construction.
    #[error("invalid expected cardinality: {0}")]
    InvalidExpectedCardinality(String),

    /// False-positive target rejected at construction.
    #[error("invalid false positive target: {0}")]
    InvalidFalsePositiveTarget(String),

    /// Shard count rejected at construction.
    #[error("invalid shard count: {0}")]
    InvalidShardCount(String),

    /// The requested filter sizing does not fit in addressable memory.
    #[error("filter too large: {0}")]
    FilterTooLarge(String),
}
