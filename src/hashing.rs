//! Seeded 64-bit mixing for ids.
//!
//! Ids are frequently sequential, so positions are derived from a full-avalanche
//! finalizer (splitmix64) rather than the raw value.

const POSITION_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
const MASK_SEED: u64 = 0xD134_2543_DE82_EF95;

/// Number of high bits reserved for shard selection.
pub(crate) const SHARD_BITS: u32 = 16;

#[inline]
pub(crate) fn mix64(value: u64, seed: u64) -> u64 {
    let mut z = value ^ seed;
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Hash used to pick the shard (high bits) and word (low 32 bits) for an id.
#[inline]
pub(crate) fn position_hash(id: u64) -> u64 {
    mix64(id, POSITION_SEED)
}

/// Maps a 32-bit hash uniformly onto `0..len` without a division.
#[inline]
pub(crate) fn fast_range(hash: u32, len: u64) -> usize {
    ((u64::from(hash) * len) >> 32) as usize
}

/// Builds a mask with exactly `hash_count` distinct bits set.
///
/// `hash_count` must be below 64. Each position consumes 6 bits of hash
/// material; the stream is re-mixed when it runs dry.
#[inline]
pub(crate) fn block_mask(position_hash: u64, hash_count: u32) -> u64 {
    debug_assert!(hash_count > 0 && hash_count < 64);

    let mut material = mix64(position_hash, MASK_SEED);
    let mut remaining = 10;
    let mut mask = 0u64;

    while mask.count_ones() < hash_count {
        if remaining == 0 {
            material = mix64(material, MASK_SEED);
            remaining = 10;
        }

        mask |= 1u64 << (material & 63);
        material >>= 6;
        remaining -= 1;
    }

    mask
}
