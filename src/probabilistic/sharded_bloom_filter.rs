use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::{
    BloomSizing, DuplicateCheck, FirstSeenError, ProbabilisticSetOptions, SeenId,
    hashing::{self, SHARD_BITS},
};

#[repr(align(128))]
struct Shard {
    words: Box<[AtomicU64]>,
    marked: AtomicU64,
}

impl Shard {
    fn new(words: u64) -> Self {
        Self {
            words: (0..words).map(|_| AtomicU64::new(0)).collect(),
            marked: AtomicU64::new(0),
        }
    }
}

/// Lock-free, sharded blocked bloom filter.
///
/// Memory is fixed at construction from [`BloomSizing`]. Each id hashes to one
/// shard and one 64-bit word inside it; `hash_count` distinct bits of that word
/// are its positions. Marking is a single `fetch_or` of the position mask:
///
/// - if any position was unset before the `fetch_or`, the id is new (`true`);
/// - if all were already set, the id is reported as seen (`false`).
///
/// Because the whole test-and-set is one read-modify-write on one word, racing
/// calls for the same id are ordered by that word's modification order and
/// exactly one of them sees an unset position. Marked bits are never cleared,
/// so a marked id is never reported as new again.
///
/// # False positives
///
/// A new id whose positions were all set by other ids is reported as seen. The
/// rate stays at or below the configured target while at most
/// `expected_cardinality` ids have been marked, and climbs monotonically after
/// that. Crossing the expected cardinality logs a single warning; poll
/// [`estimated_false_positive_rate`](Self::estimated_false_positive_rate) to
/// monitor it.
pub struct ShardedBloomFilter {
    shards: Box<[Shard]>,
    shard_mask: usize,
    sizing: BloomSizing,
    per_shard_share: u64,
    nearing_capacity: AtomicBool,
    ceiling_reported: AtomicBool,
}

impl ShardedBloomFilter {
    /// Size and allocate a filter.
    pub fn new(options: ProbabilisticSetOptions) -> Result<Self, FirstSeenError> {
        let sizing = BloomSizing::compute(
            options.expected_cardinality,
            options.false_positive_target,
            options.shard_count,
        )?;

        Ok(Self::from_sizing(sizing))
    } // end constructor

    fn from_sizing(sizing: BloomSizing) -> Self {
        tracing::debug!(
            shards = sizing.shards,
            words_per_shard = sizing.words_per_shard,
            hash_count = sizing.hash_count,
            memory_bytes = sizing.memory_bytes(),
            expected_cardinality = sizing.expected_cardinality,
            estimated_false_positive_rate = sizing.estimated_false_positive_rate,
            "firstseen.bloom.sized"
        );

        let shards = (0..sizing.shards)
            .map(|_| Shard::new(sizing.words_per_shard))
            .collect::<Box<[_]>>();

        Self {
            shard_mask: sizing.shards - 1,
            per_shard_share: sizing.expected_cardinality / sizing.shards as u64,
            shards,
            sizing,
            nearing_capacity: AtomicBool::new(false),
            ceiling_reported: AtomicBool::new(false),
        }
    }

    /// Mark `id` as seen. Returns `true` if at least one of its positions was
    /// unset before this call.
    pub fn mark(&self, id: SeenId) -> bool {
        let (shard, word, mask) = self.locate(id);

        // Single RMW on one word: modification order alone decides the winner.
        let previous = word.fetch_or(mask, Ordering::Relaxed);
        if previous & mask == mask {
            return false;
        }

        // The total cannot pass the expected cardinality before some shard
        // passes its share, so the global sum is only taken after that.
        let marked = shard.marked.fetch_add(1, Ordering::Relaxed) + 1;
        if marked == self.per_shard_share + 1 {
            self.nearing_capacity.store(true, Ordering::Relaxed);
        }
        if self.nearing_capacity.load(Ordering::Relaxed)
            && !self.ceiling_reported.load(Ordering::Relaxed)
        {
            self.check_ceiling();
        }

        true
    } // end method mark

    /// Whether all of `id`'s positions are set. Read-only; may report ids that
    /// were never marked, never misses one that was.
    pub fn contains(&self, id: SeenId) -> bool {
        let (_, word, mask) = self.locate(id);

        word.load(Ordering::Relaxed) & mask == mask
    }

    #[inline]
    fn locate(&self, id: SeenId) -> (&Shard, &AtomicU64, u64) {
        let hash = hashing::position_hash(*id);

        let shard_index = (hash >> (u64::BITS - SHARD_BITS)) as usize & self.shard_mask;
        let word_index = hashing::fast_range(hash as u32, self.sizing.words_per_shard);

        let shard = &self.shards[shard_index];
        let word = &shard.words[word_index];

        (shard, word, hashing::block_mask(hash, self.sizing.hash_count))
    }

    /// Dimensions this filter was built with.
    pub fn sizing(&self) -> &BloomSizing {
        &self.sizing
    }

    /// Number of calls that returned `true` so far.
    pub fn marked_count(&self) -> u64 {
        self.shards
            .iter()
            .map(|shard| shard.marked.load(Ordering::Relaxed))
            .sum()
    }

    /// Estimated false-positive rate at the current marked count.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        self.sizing.false_positive_rate_at(self.marked_count())
    }

    /// Whether more ids have been marked than the filter was sized for.
    pub fn is_over_capacity(&self) -> bool {
        self.marked_count() > self.sizing.expected_cardinality
    }

    /// Fraction of bits currently set. Scans the whole array.
    pub fn fill_ratio(&self) -> f64 {
        let ones: u64 = self
            .shards
            .iter()
            .flat_map(|shard| shard.words.iter())
            .map(|word| u64::from(word.load(Ordering::Relaxed).count_ones()))
            .sum();

        ones as f64 / self.sizing.total_bits() as f64
    }

    pub(crate) fn ceiling_reported(&self) -> bool {
        self.ceiling_reported.load(Ordering::Relaxed)
    }

    fn check_ceiling(&self) {
        let marked = self.marked_count();
        if marked <= self.sizing.expected_cardinality {
            return;
        }

        if !self.ceiling_reported.swap(true, Ordering::Relaxed) {
            tracing::warn!(
                marked,
                expected_cardinality = self.sizing.expected_cardinality,
                false_positive_target = self.sizing.false_positive_target,
                estimated_false_positive_rate = self.sizing.false_positive_rate_at(marked),
                "firstseen.bloom.over_capacity, marked ids exceed the sized cardinality"
            );
        }
    }
} // end of impl

impl DuplicateCheck for ShardedBloomFilter {
    fn check_and_mark(&self, id: i64) -> Result<bool, FirstSeenError> {
        Ok(self.mark(SeenId::try_from(id)?))
    }
}
