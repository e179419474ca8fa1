use std::f64::consts::LN_2;

use crate::{ExpectedCardinality, FalsePositiveTarget, FirstSeenError, ShardCount};

/// Largest number of bit positions derived per id.
pub const MAX_HASH_COUNT: u32 = 16;

/// Bits per block. All positions for one id fall inside a single block.
pub(crate) const BLOCK_BITS: u32 = u64::BITS;

/// Per-shard word indices are derived from 32 hash bits.
const MAX_WORDS_PER_SHARD: u64 = 1 << 32;

/// Average ids per word above which the estimate is reported as saturated.
const SATURATION_LOAD: f64 = BLOCK_BITS as f64;

/// Resolved dimensions of a [`ShardedBloomFilter`](crate::ShardedBloomFilter).
///
/// The classic bloom formulas assume positions spread over the whole bit
/// array. Here every id's positions share one 64-bit word, which raises the
/// false-positive rate for a given size, so the classic figures are only the
/// starting point: the array is grown until the blocked-filter estimate is at
/// or below the target, for every candidate hash count, and the smallest array
/// wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSizing {
    /// Number of shards.
    pub shards: usize,
    /// 64-bit words in each shard.
    pub words_per_shard: u64,
    /// Bit positions set per id.
    pub hash_count: u32,
    /// Distinct ids the filter was sized for.
    pub expected_cardinality: u64,
    /// Requested false-positive ceiling.
    pub false_positive_target: f64,
    /// Estimated false-positive rate once `expected_cardinality` ids are marked.
    pub estimated_false_positive_rate: f64,
}

impl BloomSizing {
    /// Size a filter for `expected_cardinality` ids at `false_positive_target`.
    ///
    /// Fails with [`FirstSeenError::FilterTooLarge`] when the array would not
    /// fit in addressable memory or exceed the per-shard word limit.
    pub fn compute(
        expected_cardinality: ExpectedCardinality,
        false_positive_target: FalsePositiveTarget,
        shard_count: ShardCount,
    ) -> Result<Self, FirstSeenError> {
        let n = *expected_cardinality;
        let p = *false_positive_target;
        let shards = *shard_count as u64;

        let max_words = MAX_WORDS_PER_SHARD
            .saturating_mul(shards)
            .min(isize::MAX as u64 / 8);

        let (classic_bits, _) = Self::classic(n, p);
        let seed_words = classic_bits.div_ceil(u64::from(BLOCK_BITS)).max(1);

        let mut best: Option<(u64, u32)> = None;

        for k in 1..=MAX_HASH_COUNT {
            let Some(words) = min_words_for(n, p, k, seed_words, max_words) else {
                continue;
            };

            let words = words.div_ceil(shards) * shards;

            match best {
                Some((best_words, _)) if best_words <= words => {}
                _ => best = Some((words, k)),
            }
        }

        let Some((words, hash_count)) = best else {
            return Err(FirstSeenError::FilterTooLarge(format!(
                "{n} ids at false positive target {p} need more than {max_words} words"
            )));
        };

        Ok(Self {
            shards: shards as usize,
            words_per_shard: words / shards,
            hash_count,
            expected_cardinality: n,
            false_positive_target: p,
            estimated_false_positive_rate: blocked_false_positive_rate(words, hash_count, n),
        })
    } // end constructor

    /// Classic bloom dimensions for `n` ids at false-positive rate `p`.
    ///
    /// Returns `(m, k)` with `m = ceil(-n ln p / (ln 2)^2)` bits and
    /// `k = round((m / n) ln 2)` hash functions (at least 1).
    pub fn classic(n: u64, p: f64) -> (u64, u32) {
        let n = n.max(1) as f64;
        let m = (-n * p.ln() / (LN_2 * LN_2)).ceil();
        let k = ((m / n) * LN_2).round().max(1f64);

        (m as u64, k as u32)
    }

    /// Total words across all shards.
    pub fn total_words(&self) -> u64 {
        self.words_per_shard * self.shards as u64
    }

    /// Total bits across all shards.
    pub fn total_bits(&self) -> u64 {
        self.total_words() * u64::from(BLOCK_BITS)
    }

    /// Heap bytes used by the bit array.
    pub fn memory_bytes(&self) -> u64 {
        self.total_words() * 8
    }

    /// Bits spent per expected id.
    pub fn bits_per_id(&self) -> f64 {
        self.total_bits() as f64 / self.expected_cardinality as f64
    }

    /// Estimated false-positive rate after `marked` distinct ids.
    ///
    /// Grows monotonically with `marked`; saturates at `1.0` once the average
    /// word holds 64 ids.
    pub fn false_positive_rate_at(&self, marked: u64) -> f64 {
        blocked_false_positive_rate(self.total_words(), self.hash_count, marked)
    }
} // end impl BloomSizing

/// Smallest word count in `[1, max_words]` whose estimate is at or below `p`.
fn min_words_for(n: u64, p: f64, k: u32, seed_words: u64, max_words: u64) -> Option<u64> {
    let mut hi = seed_words.min(max_words);
    while blocked_false_positive_rate(hi, k, n) > p {
        if hi == max_words {
            return None;
        }
        hi = hi.saturating_mul(2).min(max_words);
    }

    let mut lo = 1u64;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if blocked_false_positive_rate(mid, k, n) <= p {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    Some(hi)
}

/// False-positive estimate for a filter of `words` 64-bit blocks holding
/// `inserted` ids with `k` distinct bits each.
///
/// Ids land on words as a Poisson process with mean `inserted / words`. A word
/// that received `l` ids has each bit unset with probability `(1 - k/64)^l`,
/// and a fresh query collides when its `k` bits are all set.
pub(crate) fn blocked_false_positive_rate(words: u64, k: u32, inserted: u64) -> f64 {
    if inserted == 0 {
        return 0f64;
    }
    if words == 0 {
        return 1f64;
    }

    let load = inserted as f64 / words as f64;
    if load >= SATURATION_LOAD {
        return 1f64;
    }

    let k = f64::from(k);
    let keep = 1f64 - k / f64::from(BLOCK_BITS);
    let upper = (load + 12f64 * load.sqrt() + 16f64).ceil() as u64;

    let mut pmf = (-load).exp();
    let mut unset = 1f64;
    let mut rate = 0f64;

    for l in 0..=upper {
        if l > 0 {
            pmf *= load / l as f64;
            unset *= keep;
        }
        rate += pmf * (1f64 - unset).powf(k);
    }

    rate.min(1f64)
}
