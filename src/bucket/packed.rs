//! Bit-packed fingerprint storage.
//!
//! All fingerprints live in one [`BitVec`]. Slot `s` of bucket `b` occupies
//! bits `[(b·B + s)·f, (b·B + s + 1)·f)` where `B` is the bucket size and `f`
//! the fingerprint width. A separate count per bucket records how many of its
//! leading slots are occupied.
//!
//! ```text
//! bucket 0                      bucket 1
//! [fp0][fp1][ -- ][ -- ]        [fp0][ -- ][ -- ][ -- ]
//!  count = 2                     count = 1
//! ```

use super::FingerprintStore;
use crate::core::bitvec::BitVec;
use crate::core::params::CuckooParams;
use crate::error::{Result, SbtError};

/// Cuckoo table stored as a single bit-packed array.
///
/// Uses `f` bits per slot instead of a full `u64`, at the cost of shift
/// and mask work on every access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBucketArray {
    bits: BitVec,
    counts: Vec<u32>,
    bucket_size: usize,
    fp_size: u32,
    len: usize,
}

impl PackedBucketArray {
    #[inline]
    fn offset(&self, bucket: usize, slot: usize) -> usize {
        (bucket * self.bucket_size + slot) * self.fp_size as usize
    }

    /// Fingerprint at `slot` of `bucket`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not occupied.
    #[must_use]
    pub fn get(&self, bucket: usize, slot: usize) -> u64 {
        assert!(
            slot < self.bucket_len(bucket),
            "slot {} is empty in bucket {}",
            slot,
            bucket
        );
        self.bits.get_bits(self.offset(bucket, slot), self.fp_size)
    }

    fn position(&self, bucket: usize, fp: u64) -> Option<usize> {
        (0..self.bucket_len(bucket))
            .find(|&slot| self.bits.get_bits(self.offset(bucket, slot), self.fp_size) == fp)
    }
}

impl FingerprintStore for PackedBucketArray {
    fn with_layout(params: CuckooParams) -> Result<Self> {
        let params = CuckooParams::new(params.num_buckets, params.fp_size, params.bucket_size)?;
        if params.bucket_size > u32::MAX as usize {
            return Err(SbtError::invalid_bucket_layout(
                params.num_buckets,
                params.bucket_size,
            ));
        }
        let total_bits = params
            .num_buckets
            .checked_mul(params.bucket_size)
            .and_then(|slots| slots.checked_mul(params.fp_size as usize))
            .ok_or_else(|| {
                SbtError::invalid_parameters(format!(
                    "{} buckets x {} slots x {} bits overflows",
                    params.num_buckets, params.bucket_size, params.fp_size
                ))
            })?;

        Ok(Self {
            bits: BitVec::new(total_bits)?,
            counts: vec![0; params.num_buckets],
            bucket_size: params.bucket_size,
            fp_size: params.fp_size,
            len: 0,
        })
    }

    fn num_buckets(&self) -> usize {
        self.counts.len()
    }

    fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    fn fingerprint_size(&self) -> u32 {
        self.fp_size
    }

    #[inline]
    fn bucket_len(&self, bucket: usize) -> usize {
        self.counts[bucket] as usize
    }

    fn contains(&self, bucket: usize, fp: u64) -> bool {
        self.position(bucket, fp).is_some()
    }

    fn insert(&mut self, bucket: usize, fp: u64) -> bool {
        let count = self.bucket_len(bucket);
        if count >= self.bucket_size {
            return false;
        }
        let offset = self.offset(bucket, count);
        self.bits.set_bits(offset, self.fp_size, fp);
        self.counts[bucket] += 1;
        self.len += 1;
        true
    }

    fn remove(&mut self, bucket: usize, fp: u64) -> bool {
        let Some(slot) = self.position(bucket, fp) else {
            return false;
        };
        let count = self.bucket_len(bucket);
        for next in (slot + 1)..count {
            let value = self.bits.get_bits(self.offset(bucket, next), self.fp_size);
            let offset = self.offset(bucket, next - 1);
            self.bits.set_bits(offset, self.fp_size, value);
        }
        let last = self.offset(bucket, count - 1);
        self.bits.set_bits(last, self.fp_size, 0);
        self.counts[bucket] -= 1;
        self.len -= 1;
        true
    }

    fn replace(&mut self, bucket: usize, slot: usize, fp: u64) -> u64 {
        let old = self.get(bucket, slot);
        let offset = self.offset(bucket, slot);
        self.bits.set_bits(offset, self.fp_size, fp);
        old
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.bits.clear();
        self.counts.iter_mut().for_each(|c| *c = 0);
        self.len = 0;
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() - std::mem::size_of::<BitVec>()
            + self.bits.memory_usage()
            + self.counts.capacity() * std::mem::size_of::<u32>()
    }

    fn layout_name(&self) -> &'static str {
        "packed"
    }
}
