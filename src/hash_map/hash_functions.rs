//! Hash functions and bucket sizing for [`HashTable`](super::HashTable)
//!
//! Keys without a custom hash are hashed with Bob Jenkins' one-at-a-time hash
//! over their byte representation, computed in 64-bit wrapping arithmetic.
//!
//! ```rust
//! use ordered_collections::hash_map::{bucket_index, one_at_a_time, table_size};
//!
//! let buckets = table_size(0);
//! let slot = bucket_index(one_at_a_time(b"key"), buckets);
//! assert!(slot < buckets);
//! ```

/// Bucket count used when a table is created with a minimum size of zero.
pub const DEFAULT_BUCKET_COUNT: usize = 1024;

/// Smallest bucket count a table is created with.
pub const MIN_BUCKET_COUNT: usize = 64;

/// Largest bucket count a table may be created with.
pub const MAX_BUCKET_COUNT: usize = 1 << 24;

/// One-at-a-time hash: per-byte accumulate and mix, then a final avalanche.
#[inline]
pub fn one_at_a_time(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0;
    for &byte in bytes {
        hash = hash.wrapping_add(u64::from(byte));
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash
}

/// Bucket count for a requested minimum size.
///
/// Zero selects [`DEFAULT_BUCKET_COUNT`]; anything smaller than
/// [`MIN_BUCKET_COUNT`] is rounded up to it.
#[inline]
pub fn table_size(min_size: usize) -> usize {
    match min_size {
        0 => DEFAULT_BUCKET_COUNT,
        n => n.max(MIN_BUCKET_COUNT),
    }
}

/// Reduce a hash to a bucket index.
#[inline]
pub fn bucket_index(hash: u64, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0);
    (hash % bucket_count as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(one_at_a_time(&[]), 0);
    }

    #[test]
    fn test_known_values() {
        // Single byte: 'a' = 0x61
        let mut h: u64 = 0x61;
        h = h.wrapping_add(h << 10);
        h ^= h >> 6;
        h = h.wrapping_add(h << 3);
        h ^= h >> 11;
        h = h.wrapping_add(h << 15);
        assert_eq!(one_at_a_time(b"a"), h);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(one_at_a_time(b"ab"), one_at_a_time(b"ba"));
        assert_eq!(one_at_a_time(b"key3"), one_at_a_time(b"key3"));
    }

    #[test]
    fn test_long_input_wraps() {
        let data = vec![0xffu8; 4096];
        // Must not overflow-panic in debug builds.
        let _ = one_at_a_time(&data);
    }

    #[test]
    fn test_table_size() {
        assert_eq!(table_size(0), DEFAULT_BUCKET_COUNT);
        assert_eq!(table_size(1), MIN_BUCKET_COUNT);
        assert_eq!(table_size(63), MIN_BUCKET_COUNT);
        assert_eq!(table_size(64), 64);
        assert_eq!(table_size(1000), 1000);
    }

    #[test]
    fn test_bucket_index_in_range() {
        for hash in [0u64, 1, 63, 64, u64::MAX] {
            assert!(bucket_index(hash, 64) < 64);
        }
        assert_eq!(bucket_index(130, 64), 2);
    }
}
