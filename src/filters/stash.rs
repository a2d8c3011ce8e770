//! Cuckoo filter with an overflow stash.
//!
//! The stash is one extra bucket of `stash_size` raw items. When the base
//! filter exhausts displacement, the item is kept in the stash instead of
//! being dropped. Lookups and deletions consult both the table and the stash.
//!
//! Each successful insertion lands in exactly one place: the table or the
//! stash. Duplicate-suppressing insertion checks the stash before the table,
//! so an item already stashed is never placed a second time.

use crate::bucket::{BucketArray, FingerprintStore};
use crate::core::filter::{DeletableFilter, MembershipFilter};
use crate::error::Result;
use crate::filters::cuckoo::{GenericCuckooFilter, InsertOutcome};
use crate::hash::{FilterHasher, XxHasher};
use rand::rngs::StdRng;
use rand::Rng;

/// Cuckoo filter plus a bounded overflow stash of raw items.
///
/// # Examples
///
/// ```
/// use sbtree::filters::StashedCuckooFilter;
///
/// let mut filter = StashedCuckooFilter::new(10, 8, 1, 500, 64).unwrap();
/// assert_eq!(filter.total_capacity(), 74);
/// assert!(filter.insert("GCGT"));
/// assert!(filter.contains("GCGT"));
/// ```
#[derive(Debug, Clone)]
pub struct StashedCuckooFilter<S = BucketArray, H = XxHasher, R = StdRng> {
    filter: GenericCuckooFilter<S, H, R>,
    stash: Vec<Vec<u8>>,
    stash_size: usize,
}

impl StashedCuckooFilter<BucketArray, XxHasher, StdRng> {
    /// Create a bucket-array filter with a stash of `stash_size` items.
    ///
    /// # Errors
    ///
    /// Same as [`CuckooFilter::new`](crate::filters::CuckooFilter::new).
    pub fn new(
        num_buckets: usize,
        fp_size: u32,
        bucket_size: usize,
        max_iter: usize,
        stash_size: usize,
    ) -> Result<Self> {
        let filter = GenericCuckooFilter::new(num_buckets, fp_size, bucket_size, max_iter)?;
        Ok(Self::from_filter(filter, stash_size))
    }
}

impl<S, H, R> StashedCuckooFilter<S, H, R>
where
    S: FingerprintStore,
    H: FilterHasher,
    R: Rng,
{
    /// Attach an empty stash to an existing filter.
    #[must_use]
    pub fn from_filter(filter: GenericCuckooFilter<S, H, R>, stash_size: usize) -> Self {
        Self {
            filter,
            stash: Vec::with_capacity(stash_size),
            stash_size,
        }
    }

    /// Insert an item, allowing duplicates. Falls back to the stash when the
    /// table is full.
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        self.try_insert(item.as_ref(), false).is_success()
    }

    /// Insert an item unless it is already stashed or its fingerprint is
    /// found in a target bucket.
    pub fn insert_no_duplicates<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        self.try_insert(item.as_ref(), true).is_success()
    }

    /// Insert and report where the item went.
    pub fn try_insert(&mut self, item: &[u8], unique: bool) -> InsertOutcome {
        if unique && self.stash_contains(item) {
            return InsertOutcome::Duplicate;
        }
        match self.filter.try_insert(item, unique) {
            InsertOutcome::Exhausted => self.push_stash(item),
            outcome => outcome,
        }
    }

    fn push_stash(&mut self, item: &[u8]) -> InsertOutcome {
        if self.is_stash_full() {
            #[cfg(feature = "trace")]
            tracing::warn!(stash_size = self.stash_size, "StashedCuckooFilter stash full");
            return InsertOutcome::Exhausted;
        }
        self.stash.push(item.to_vec());
        #[cfg(feature = "trace")]
        tracing::debug!(
            stashed = self.stash.len(),
            stash_size = self.stash_size,
            "StashedCuckooFilter::insert stashed"
        );
        InsertOutcome::Stashed
    }

    fn stash_contains(&self, item: &[u8]) -> bool {
        self.stash.iter().any(|s| s.as_slice() == item)
    }

    /// Test membership in the table or the stash.
    #[must_use]
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        let item = item.as_ref();
        self.filter.contains(item) || self.stash_contains(item)
    }

    /// Remove one copy of the item, from the table first, then the stash.
    pub fn delete<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        let item = item.as_ref();
        if self.filter.delete(item) {
            return true;
        }
        match self.stash.iter().position(|s| s.as_slice() == item) {
            Some(pos) => {
                self.stash.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Items in the table plus items in the stash.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.filter.num_items() + self.stash.len()
    }

    /// Table slots plus stash slots.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.filter.capacity() + self.stash_size
    }

    /// Items currently stashed.
    #[must_use]
    pub fn stash_len(&self) -> usize {
        self.stash.len()
    }

    /// Maximum stashed items.
    #[must_use]
    pub fn stash_size(&self) -> usize {
        self.stash_size
    }

    /// Whether the stash has no free slot.
    #[must_use]
    pub fn is_stash_full(&self) -> bool {
        self.stash.len() >= self.stash_size
    }

    /// The base filter.
    #[must_use]
    pub fn filter(&self) -> &GenericCuckooFilter<S, H, R> {
        &self.filter
    }

    /// Remove everything from the table and the stash.
    pub fn clear(&mut self) {
        self.filter.clear();
        self.stash.clear();
    }

    /// Bytes held by the table and the stash.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.filter.memory_usage()
            + std::mem::size_of::<Vec<Vec<u8>>>()
            + self
                .stash
                .iter()
                .map(|s| std::mem::size_of::<Vec<u8>>() + s.len())
                .sum::<usize>()
    }
}

impl<S, H, R> MembershipFilter for StashedCuckooFilter<S, H, R>
where
    S: FingerprintStore,
    H: FilterHasher,
    R: Rng,
{
    fn insert(&mut self, item: &[u8]) -> bool {
        StashedCuckooFilter::insert(self, item)
    }

    fn contains(&self, item: &[u8]) -> bool {
        StashedCuckooFilter::contains(self, item)
    }

    fn len(&self) -> usize {
        self.num_items()
    }

    fn memory_usage(&self) -> usize {
        StashedCuckooFilter::memory_usage(self)
    }

    fn name(&self) -> &'static str {
        "StashedCuckooFilter"
    }
}

impl<S, H, R> DeletableFilter for StashedCuckooFilter<S, H, R>
where
    S: FingerprintStore,
    H: FilterHasher,
    R: Rng,
{
    fn delete(&mut self, item: &[u8]) -> bool {
        StashedCuckooFilter::delete(self, item)
    }
}
