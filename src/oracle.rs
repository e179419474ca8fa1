//! Top-level entrypoint that wires a strategy behind one check.
//!
//! [`MembershipOracle`] owns the seen-state for its lifetime. Build one per
//! dedup domain and share it across threads by reference or `Arc`.

use crate::{
    ExactSeenSet, ExactSetOptions, ExpectedCardinality, FirstSeenError, ProbabilisticSetOptions,
    SeenId, ShardedBloomFilter,
};

/// The "duplicate check" capability.
///
/// Implementations answer, atomically per id, whether this is the first time
/// `id` has been seen, and mark it seen if so.
pub trait DuplicateCheck: Send + Sync {
    /// Returns `Ok(true)` the first time `id` is seen and `Ok(false)` after.
    ///
    /// Fails with [`FirstSeenError::InvalidArgument`] for a negative `id`,
    /// without touching state.
    fn check_and_mark(&self, id: i64) -> Result<bool, FirstSeenError>;
}

/// Strategy selection and its options.
#[derive(Clone, Debug)]
pub enum OracleStrategy {
    /// Store every id. No false positives, memory grows with distinct ids.
    Exact(ExactSetOptions),
    /// Fixed-size sharded bloom filter. False positives below the target.
    Probabilistic(ProbabilisticSetOptions),
}

/// Top-level configuration for [`MembershipOracle`].
#[derive(Clone, Debug)]
pub struct MembershipOracleOptions {
    /// Strategy backing the oracle.
    pub strategy: OracleStrategy,
}

/// Which strategy an oracle was built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    /// [`ExactSeenSet`].
    Exact,
    /// [`ShardedBloomFilter`].
    Probabilistic,
}

enum SeenState {
    Exact(ExactSeenSet),
    Probabilistic(ShardedBloomFilter),
}

/// Concurrency-safe first-seen membership oracle.
///
/// # Guarantees
///
/// - **No false negatives:** once a call returns `true` for an id, every later
///   call with that id returns `false`
/// - **Exactly one winner:** of any number of concurrent calls with the same
///   id, exactly one returns `true`
/// - **Invalid input is inert:** a negative id fails with
///   [`FirstSeenError::InvalidArgument`] and changes nothing
/// - **Monotonic state:** nothing is ever unmarked
///
/// The probabilistic strategy additionally reports some new ids as already
/// seen, at a rate below its configured target while within its expected
/// cardinality.
///
/// # Examples
///
/// ```
/// use firstseen::{FirstSeenError, MembershipOracle};
///
/// let oracle = MembershipOracle::exact();
///
/// assert_eq!(oracle.check_and_mark(7), Ok(true));
/// assert_eq!(oracle.check_and_mark(7), Ok(false));
/// assert_eq!(oracle.check_and_mark(-1), Err(FirstSeenError::InvalidArgument(-1)));
/// ```
pub struct MembershipOracle {
    state: SeenState,
}

impl MembershipOracle {
    /// Create a new [`MembershipOracle`].
    ///
    /// Fails only when probabilistic sizing cannot be satisfied.
    pub fn new(options: MembershipOracleOptions) -> Result<Self, FirstSeenError> {
        let state = match options.strategy {
            OracleStrategy::Exact(options) => SeenState::Exact(ExactSeenSet::new(options)),
            OracleStrategy::Probabilistic(options) => {
                SeenState::Probabilistic(ShardedBloomFilter::new(options)?)
            }
        };

        Ok(Self { state })
    }

    /// Exact oracle with default options.
    pub fn exact() -> Self {
        Self {
            state: SeenState::Exact(ExactSeenSet::new(ExactSetOptions::default())),
        }
    }

    /// Probabilistic oracle sized for `expected_cardinality` ids at the default target.
    pub fn probabilistic(expected_cardinality: u64) -> Result<Self, FirstSeenError> {
        let expected_cardinality = ExpectedCardinality::try_from(expected_cardinality)?;

        Self::new(MembershipOracleOptions {
            strategy: OracleStrategy::Probabilistic(ProbabilisticSetOptions::new(
                expected_cardinality,
            )),
        })
    }

    /// Check whether `id` is seen for the first time and mark it.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: first sighting; `id` is now marked and visible to every later call
    /// - `Ok(false)`: `id` was already marked (or, probabilistically, appears to be)
    /// - `Err(FirstSeenError::InvalidArgument)`: `id` is negative; no state changed
    pub fn check_and_mark(&self, id: i64) -> Result<bool, FirstSeenError> {
        let id = SeenId::try_from(id)?;

        Ok(self.mark(id))
    }

    /// Infallible [`check_and_mark`](Self::check_and_mark) for an already validated id.
    pub fn mark(&self, id: SeenId) -> bool {
        match &self.state {
            SeenState::Exact(set) => set.mark(id),
            SeenState::Probabilistic(filter) => filter.mark(id),
        }
    }

    /// Strategy in use.
    pub fn strategy_kind(&self) -> StrategyKind {
        match &self.state {
            SeenState::Exact(_) => StrategyKind::Exact,
            SeenState::Probabilistic(_) => StrategyKind::Probabilistic,
        }
    }

    /// Number of calls that returned `true` so far.
    pub fn marked_count(&self) -> u64 {
        match &self.state {
            SeenState::Exact(set) => set.len() as u64,
            SeenState::Probabilistic(filter) => filter.marked_count(),
        }
    }

    /// Access the exact set, if this oracle uses it.
    pub fn exact_set(&self) -> Option<&ExactSeenSet> {
        match &self.state {
            SeenState::Exact(set) => Some(set),
            SeenState::Probabilistic(_) => None,
        }
    }

    /// Access the bloom filter, if this oracle uses it.
    pub fn bloom_filter(&self) -> Option<&ShardedBloomFilter> {
        match &self.state {
            SeenState::Exact(_) => None,
            SeenState::Probabilistic(filter) => Some(filter),
        }
    }
}

impl DuplicateCheck for MembershipOracle {
    fn check_and_mark(&self, id: i64) -> Result<bool, FirstSeenError> {
        MembershipOracle::check_and_mark(self, id)
    }
}
