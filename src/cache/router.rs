//! Key Router Module
//!
//! Maps keys onto shard indices with a 32-bit FNV-1 hash.

const FNV32_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV32_PRIME: u32 = 16_777_619;

// == FNV-1 ==
/// Computes the 32-bit FNV-1 hash of `bytes` (multiply, then xor).
///
/// Deterministic across processes and compiler versions, unlike `std`'s
/// randomly seeded hasher.
pub fn fnv32(bytes: &[u8]) -> u32 {
    let mut hash = FNV32_OFFSET_BASIS;
    for byte in bytes {
        hash = hash.wrapping_mul(FNV32_PRIME);
        hash ^= u32::from(*byte);
    }
    hash
}

// == Shard Index ==
/// Returns the shard that owns `key` in a cache of `shard_count` shards.
///
/// `shard_count` must be non-zero; caches validate this at construction.
#[inline]
pub fn shard_index(key: &str, shard_count: usize) -> usize {
    fnv32(key.as_bytes()) as usize % shard_count
}
