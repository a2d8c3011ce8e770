//! Object-per-bucket fingerprint storage.

use super::FingerprintStore;
use crate::core::params::CuckooParams;
use crate::error::Result;
use rand::Rng;

/// Fixed-capacity, ordered sequence of fingerprints.
///
/// Plain [`insert`](Bucket::insert) allows duplicates;
/// [`insert_unique`](Bucket::insert_unique) rejects them.
///
/// # Examples
///
/// ```
/// use sbtree::bucket::Bucket;
///
/// let mut bucket = Bucket::new(2);
/// assert!(bucket.insert(7));
/// assert!(!bucket.insert_unique(7));
/// assert!(bucket.insert(7));
/// assert!(bucket.is_full());
/// assert!(!bucket.insert(9));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    entries: Vec<u64>,
    capacity: usize,
}

impl Bucket {
    /// Create an empty bucket with room for `capacity` fingerprints.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of fingerprints.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the bucket holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether every slot is taken.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Whether `fp` is present.
    #[must_use]
    pub fn contains(&self, fp: u64) -> bool {
        self.entries.contains(&fp)
    }

    /// Append `fp`. Fails if full.
    pub fn insert(&mut self, fp: u64) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push(fp);
        true
    }

    /// Append `fp` unless full or already present.
    pub fn insert_unique(&mut self, fp: u64) -> bool {
        !self.contains(fp) && self.insert(fp)
    }

    /// Remove the first copy of `fp`. Fails if absent.
    pub fn remove(&mut self, fp: u64) -> bool {
        match self.entries.iter().position(|&e| e == fp) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace a uniformly chosen resident with `fp`, returning the evicted
    /// fingerprint.
    ///
    /// # Panics
    ///
    /// Panics if the bucket is empty.
    pub fn swap_with_random_entry<R: Rng + ?Sized>(&mut self, fp: u64, rng: &mut R) -> u64 {
        let slot = rng.gen_range(0..self.entries.len());
        std::mem::replace(&mut self.entries[slot], fp)
    }

    /// Resident fingerprints in slot order.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.entries
    }
}

/// Cuckoo table stored as one [`Bucket`] per index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketArray {
    buckets: Vec<Bucket>,
    bucket_size: usize,
    fp_size: u32,
    len: usize,
}

impl BucketArray {
    /// Resident fingerprints of one bucket.
    #[must_use]
    pub fn entries(&self, bucket: usize) -> &[u64] {
        self.buckets[bucket].as_slice()
    }

    /// Borrow one bucket.
    #[must_use]
    pub fn bucket(&self, bucket: usize) -> &Bucket {
        &self.buckets[bucket]
    }
}

impl FingerprintStore for BucketArray {
    fn with_layout(params: CuckooParams) -> Result<Self> {
        let params = CuckooParams::new(params.num_buckets, params.fp_size, params.bucket_size)?;
        Ok(Self {
            buckets: vec![Bucket::new(params.bucket_size); params.num_buckets],
            bucket_size: params.bucket_size,
            fp_size: params.fp_size,
            len: 0,
        })
    }

    fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    fn fingerprint_size(&self) -> u32 {
        self.fp_size
    }

    fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets[bucket].len()
    }

    fn contains(&self, bucket: usize, fp: u64) -> bool {
        self.buckets[bucket].contains(fp)
    }

    fn insert(&mut self, bucket: usize, fp: u64) -> bool {
        let inserted = self.buckets[bucket].insert(fp);
        self.len += usize::from(inserted);
        inserted
    }

    fn remove(&mut self, bucket: usize, fp: u64) -> bool {
        let removed = self.buckets[bucket].remove(fp);
        self.len -= usize::from(removed);
        removed
    }

    fn replace(&mut self, bucket: usize, slot: usize, fp: u64) -> u64 {
        std::mem::replace(&mut self.buckets[bucket].entries[slot], fp)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| b.entries.clear());
        self.len = 0;
    }

    fn memory_usage(&self) -> usize {
        let per_bucket = std::mem::size_of::<Bucket>() + self.bucket_size * std::mem::size_of::<u64>();
        std::mem::size_of::<Self>() + self.buckets.len() * per_bucket
    }

    fn layout_name(&self) -> &'static str {
        "bucket-array"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bucket_insert_until_full() {
        let mut bucket = Bucket::new(4);
        for fp in 0..4 {
            assert!(bucket.insert(fp));
        }
        assert!(bucket.is_full());
        assert!(!bucket.insert(99));
        assert_eq!(bucket.len(), 4);
    }

    #[test]
    fn test_bucket_duplicates() {
        let mut bucket = Bucket::new(4);
        assert!(bucket.insert(5));
        assert!(bucket.insert(5));
        assert!(!bucket.insert_unique(5));
        assert!(bucket.insert_unique(6));
        assert_eq!(bucket.as_slice(), &[5, 5, 6]);
    }

    #[test]
    fn test_bucket_remove_shifts() {
        let mut bucket = Bucket::new(4);
        for fp in [1, 2, 3, 2] {
            bucket.insert(fp);
        }
        assert!(bucket.remove(2));
        assert_eq!(bucket.as_slice(), &[1, 3, 2]);
        assert!(!bucket.remove(9));
    }

    #[test]
    fn test_bucket_swap_returns_evicted() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut bucket = Bucket::new(3);
        for fp in [10, 20, 30] {
            bucket.insert(fp);
        }
        let evicted = bucket.swap_with_random_entry(40, &mut rng);
        assert!([10, 20, 30].contains(&evicted));
        assert!(bucket.contains(40));
        assert!(!bucket.contains(evicted));
        assert_eq!(bucket.len(), 3);
    }

    #[test]
    fn test_bucket_swap_single_entry() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut bucket = Bucket::new(1);
        bucket.insert(7);
        assert_eq!(bucket.swap_with_random_entry(8, &mut rng), 7);
        assert_eq!(bucket.as_slice(), &[8]);
    }

    #[test]
    fn test_array_len_tracking() {
        let mut arr = BucketArray::with_layout(CuckooParams::new(4, 8, 2).unwrap()).unwrap();
        assert!(arr.insert(0, 1));
        assert!(arr.insert(0, 2));
        assert!(!arr.insert(0, 3));
        assert!(arr.insert(3, 1));
        assert_eq!(arr.len(), 3);
        assert!(arr.remove(0, 1));
        assert_eq!(arr.len(), 2);
        arr.clear();
        assert!(arr.is_empty());
        assert_eq!(arr.bucket_len(0), 0);
    }

    #[test]
    fn test_array_replace() {
        let mut arr = BucketArray::with_layout(CuckooParams::new(2, 8, 2).unwrap()).unwrap();
        arr.insert(1, 5);
        arr.insert(1, 6);
        assert_eq!(arr.replace(1, 1, 7), 6);
        assert_eq!(arr.entries(1), &[5, 7]);
        assert_eq!(arr.len(), 2);
    }

    #[test]
    fn test_array_rejects_bad_layout() {
        let bad = CuckooParams {
            num_buckets: 0,
            fp_size: 8,
            bucket_size: 4,
        };
        assert!(BucketArray::with_layout(bad).is_err());
    }
}
