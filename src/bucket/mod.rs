//! Fingerprint storage for cuckoo filters.
//!
//! A cuckoo table is `num_buckets` buckets of up to `bucket_size`
//! fingerprints each. Two interchangeable layouts implement
//! [`FingerprintStore`]:
//!
//! - [`BucketArray`]: one [`Bucket`] object (a small vector) per bucket.
//! - [`PackedBucketArray`]: a single bit-packed array of
//!   `num_buckets × bucket_size × fp_size` bits plus a per-bucket count.
//!
//! Both keep a bucket's entries contiguous and in insertion order, and both
//! shift later entries down on removal. Under the same sequence of
//! operations and random draws they hold identical contents, so a filter
//! answers every query the same way whichever layout backs it.

use crate::core::params::CuckooParams;
use crate::error::Result;
use rand::Rng;

mod list;
mod packed;

pub use list::{Bucket, BucketArray};
pub use packed::PackedBucketArray;

/// Storage backend of a cuckoo filter.
///
/// Bucket indices passed to these methods are always `< num_buckets()`;
/// implementations may panic otherwise.
pub trait FingerprintStore: Clone + std::fmt::Debug {
    /// Allocate an empty table with the given layout.
    ///
    /// # Errors
    ///
    /// Propagates layout validation and allocation-size errors.
    fn with_layout(params: CuckooParams) -> Result<Self>
    where
        Self: Sized;

    /// Number of buckets.
    fn num_buckets(&self) -> usize;

    /// Slots per bucket.
    fn bucket_size(&self) -> usize;

    /// Fingerprint width in bits.
    fn fingerprint_size(&self) -> u32;

    /// Fingerprints currently held by `bucket`.
    fn bucket_len(&self, bucket: usize) -> usize;

    /// Whether `bucket` has no free slot.
    fn is_full(&self, bucket: usize) -> bool {
        self.bucket_len(bucket) >= self.bucket_size()
    }

    /// Whether `bucket` holds `fp`.
    fn contains(&self, bucket: usize, fp: u64) -> bool;

    /// Append `fp` to `bucket`. Fails if the bucket is full.
    fn insert(&mut self, bucket: usize, fp: u64) -> bool;

    /// Append `fp` unless the bucket is full or already holds it.
    fn insert_unique(&mut self, bucket: usize, fp: u64) -> bool {
        !self.contains(bucket, fp) && self.insert(bucket, fp)
    }

    /// Remove the first copy of `fp` from `bucket`, shifting later entries
    /// down. Fails if absent.
    fn remove(&mut self, bucket: usize, fp: u64) -> bool;

    /// Overwrite the entry at `slot` with `fp` and return the old entry.
    ///
    /// `slot` must be `< bucket_len(bucket)`.
    fn replace(&mut self, bucket: usize, slot: usize, fp: u64) -> u64;

    /// Swap `fp` with a uniformly chosen resident of `bucket`.
    ///
    /// Returns the chosen slot and the evicted fingerprint. Must not be
    /// called on an empty bucket. Never performs a capacity check.
    fn swap_with_random_entry<R: Rng + ?Sized>(
        &mut self,
        bucket: usize,
        fp: u64,
        rng: &mut R,
    ) -> (usize, u64) {
        debug_assert!(self.bucket_len(bucket) > 0, "swap on empty bucket");
        let slot = rng.gen_range(0..self.bucket_len(bucket));
        (slot, self.replace(bucket, slot, fp))
    }

    /// Total fingerprints stored across all buckets.
    fn len(&self) -> usize;

    /// Whether the table holds no fingerprints.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every fingerprint.
    fn clear(&mut self);

    /// Advisory in-memory footprint in bytes.
    fn memory_usage(&self) -> usize;

    /// Layout name used in logs.
    fn layout_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params() -> CuckooParams {
        CuckooParams::new(8, 12, 4).unwrap()
    }

    /// Replays one operation script against a store and records what it saw.
    fn replay<S: FingerprintStore>(store: &mut S, seed: u64) -> Vec<u64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut log = Vec::new();
        for i in 0u64..200 {
            let bucket = (i * 7 % 8) as usize;
            let fp = (i * 2654435761) & 0xFFF;
            match i % 5 {
                0 | 1 => log.push(u64::from(store.insert(bucket, fp))),
                2 => log.push(u64::from(store.insert_unique(bucket, fp & 0xF))),
                3 => {
                    if store.bucket_len(bucket) > 0 {
                        log.push(store.swap_with_random_entry(bucket, fp, &mut rng).1);
                    }
                }
                _ => log.push(u64::from(store.remove(bucket, fp & 0xF))),
            }
            log.push(store.len() as u64);
        }
        log
    }

    #[test]
    fn test_layouts_are_interchangeable() {
        let mut list = BucketArray::with_layout(params()).unwrap();
        let mut packed = PackedBucketArray::with_layout(params()).unwrap();
        assert_eq!(replay(&mut list, 11), replay(&mut packed, 11));
        for bucket in 0..8 {
            assert_eq!(list.bucket_len(bucket), packed.bucket_len(bucket));
            for slot in 0..list.bucket_len(bucket) {
                assert_eq!(list.entries(bucket)[slot], packed.get(bucket, slot));
            }
        }
    }

    #[test]
    fn test_default_insert_unique() {
        let mut store = BucketArray::with_layout(params()).unwrap();
        assert!(store.insert_unique(3, 42));
        assert!(!store.insert_unique(3, 42));
        assert!(store.insert_unique(4, 42));
        assert_eq!(store.len(), 2);
    }
}
