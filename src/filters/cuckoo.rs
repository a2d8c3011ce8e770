//! Cuckoo filter with pluggable fingerprint storage.
//!
//! # Algorithm
//!
//! Each item maps to a fingerprint and two candidate buckets (see
//! [`Fingerprinter`]). Insertion places the fingerprint in the first
//! candidate with a free slot, preferring the primary bucket. When both are
//! full, a random walk begins: pick one candidate at random, swap the
//! fingerprint with a random resident, and try to place the evicted
//! fingerprint in its own alternate bucket. The walk gives up after
//! `max_iter` swaps.
//!
//! A failed walk is rolled back: every swap is undone in reverse order, so
//! the table is left exactly as it was before the call. No previously
//! inserted item is ever lost, and a `false` from `insert` means nothing
//! changed.
//!
//! # Storage
//!
//! [`GenericCuckooFilter`] is generic over a [`FingerprintStore`]:
//!
//! | Alias               | Storage               |
//! |---------------------|-----------------------|
//! | [`CuckooFilter`]    | [`BucketArray`]       |
//! | [`CuckooFilterBit`] | [`PackedBucketArray`] |
//!
//! Both answer every query identically given the same configuration, seed
//! and insertion sequence.
//!
//! # Examples
//!
//! ```
//! use sbtree::filters::CuckooFilter;
//!
//! let mut filter = CuckooFilter::with_seed(10, 8, 1, 500, 7).unwrap();
//! assert!(filter.insert("GCGTTT"));
//! assert!(filter.insert("GCGTTT"));
//! assert_eq!(filter.num_items(), 2);
//! assert!(filter.delete("GCGTTT"));
//! assert!(filter.contains("GCGTTT"));
//! ```

#![allow(clippy::cast_precision_loss)]

use crate::bucket::{BucketArray, FingerprintStore, PackedBucketArray};
use crate::core::filter::{DeletableFilter, MembershipFilter};
use crate::core::params::{self, CuckooParams};
use crate::error::Result;
use crate::hash::{FilterHasher, Fingerprinter, Placement, XxHasher};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Cuckoo filter backed by one [`Bucket`](crate::bucket::Bucket) per index.
pub type CuckooFilter<H = XxHasher, R = StdRng> = GenericCuckooFilter<BucketArray, H, R>;

/// Cuckoo filter backed by a single bit-packed array.
pub type CuckooFilterBit<H = XxHasher, R = StdRng> = GenericCuckooFilter<PackedBucketArray, H, R>;

/// Result of one insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored in one of the item's two buckets.
    Placed,
    /// Table was full; the raw item went to the overflow stash.
    Stashed,
    /// Duplicate-suppressing insert found the fingerprint already present.
    Duplicate,
    /// Displacement hit `max_iter` and was rolled back.
    Exhausted,
}

impl InsertOutcome {
    /// Whether the item is now stored.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, Self::Placed | Self::Stashed)
    }
}

/// Cuckoo filter generic over storage `S`, hasher `H` and eviction RNG `R`.
#[derive(Debug, Clone)]
pub struct GenericCuckooFilter<S, H = XxHasher, R = StdRng> {
    store: S,
    fingerprinter: Fingerprinter<H>,
    max_iter: usize,
    num_items: usize,
    rng: R,
}

impl<S: FingerprintStore> GenericCuckooFilter<S, XxHasher, StdRng> {
    /// Create a filter with an explicit layout and an entropy-seeded RNG.
    ///
    /// # Errors
    ///
    /// - [`SbtError::InvalidBucketLayout`](crate::SbtError::InvalidBucketLayout)
    ///   if `num_buckets` or `bucket_size` is zero
    /// - [`SbtError::InvalidFingerprintSize`](crate::SbtError::InvalidFingerprintSize)
    ///   if `fp_size` is not in `1..=64`
    pub fn new(num_buckets: usize, fp_size: u32, bucket_size: usize, max_iter: usize) -> Result<Self> {
        let params = CuckooParams::new(num_buckets, fp_size, bucket_size)?;
        Self::with_parts(params, max_iter, XxHasher::new(), StdRng::from_entropy())
    }

    /// Like [`new`](Self::new) with a reproducible eviction sequence.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn with_seed(
        num_buckets: usize,
        fp_size: u32,
        bucket_size: usize,
        max_iter: usize,
        seed: u64,
    ) -> Result<Self> {
        let params = CuckooParams::new(num_buckets, fp_size, bucket_size)?;
        Self::with_parts(params, max_iter, XxHasher::new(), StdRng::seed_from_u64(seed))
    }

    /// Size the table from an expected item count and false positive rate.
    ///
    /// ```
    /// use sbtree::filters::CuckooFilter;
    ///
    /// let filter = CuckooFilter::auto(10_000, 0.01, 500).unwrap();
    /// assert_eq!(filter.bucket_size(), 4);
    /// assert_eq!(filter.fingerprint_size(), 10);
    /// assert_eq!(filter.num_buckets(), 2618);
    /// ```
    ///
    /// # Errors
    ///
    /// See [`CuckooParams::auto`].
    pub fn auto(expected_num: usize, fp_prob: f64, max_iter: usize) -> Result<Self> {
        let params = CuckooParams::auto(expected_num, fp_prob)?;
        Self::with_parts(params, max_iter, XxHasher::new(), StdRng::from_entropy())
    }

    /// Build from resolved parameters, seeding from entropy when `seed` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Propagates storage allocation errors.
    pub fn from_params(params: CuckooParams, max_iter: usize, seed: Option<u64>) -> Result<Self> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_parts(params, max_iter, XxHasher::new(), rng)
    }
}

impl<S, H, R> GenericCuckooFilter<S, H, R>
where
    S: FingerprintStore,
    H: FilterHasher,
    R: Rng,
{
    /// Assemble a filter from a layout, hasher and RNG.
    ///
    /// # Errors
    ///
    /// Propagates storage validation errors.
    pub fn with_parts(params: CuckooParams, max_iter: usize, hasher: H, rng: R) -> Result<Self> {
        let store = S::with_layout(params)?;

        #[cfg(feature = "trace")]
        tracing::debug!(
            num_buckets = params.num_buckets,
            fp_size = params.fp_size,
            bucket_size = params.bucket_size,
            max_iter,
            layout = store.layout_name(),
            hasher = hasher.name(),
            "CuckooFilter::new"
        );

        Ok(Self {
            fingerprinter: Fingerprinter::new(hasher, params.num_buckets, params.fp_size),
            store,
            max_iter,
            num_items: 0,
            rng,
        })
    }

    /// Insert an item, allowing duplicate fingerprints.
    ///
    /// Returns `false` when displacement is exhausted; the filter is
    /// unchanged in that case.
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        self.try_insert(item.as_ref(), false).is_success()
    }

    /// Insert an item unless its fingerprint is already stored.
    ///
    /// Both of the item's buckets are checked before anything moves, so an
    /// item never ends up counted twice. A match while relocating an evicted
    /// fingerprint rolls the walk back and also returns `false`.
    pub fn insert_no_duplicates<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        self.try_insert(item.as_ref(), true).is_success()
    }

    /// Insert and report exactly what happened.
    pub fn try_insert(&mut self, item: &[u8], unique: bool) -> InsertOutcome {
        let Placement {
            fingerprint,
            index_one,
            index_two,
        } = self.fingerprinter.placement(item);

        if unique
            && (self.store.contains(index_one, fingerprint)
                || self.store.contains(index_two, fingerprint))
        {
            return InsertOutcome::Duplicate;
        }

        for index in [index_one, index_two] {
            if self.store.insert(index, fingerprint) {
                self.num_items += 1;
                #[cfg(feature = "trace")]
                tracing::trace!(index, fingerprint, "CuckooFilter::insert");
                return InsertOutcome::Placed;
            }
        }

        self.displace(fingerprint, index_one, index_two, unique)
    }

    fn displace(
        &mut self,
        fingerprint: u64,
        index_one: usize,
        index_two: usize,
        unique: bool,
    ) -> InsertOutcome {
        let mut index = if self.rng.gen::<bool>() {
            index_one
        } else {
            index_two
        };
        let mut homeless = fingerprint;
        let mut path = Vec::with_capacity(self.max_iter.min(64));

        for _ in 0..self.max_iter {
            let (slot, evicted) = self.store.swap_with_random_entry(index, homeless, &mut self.rng);
            path.push((index, slot));
            homeless = evicted;
            index = self.fingerprinter.alt_index(index, homeless);

            if unique && self.store.contains(index, homeless) {
                break;
            }
            if self.store.insert(index, homeless) {
                self.num_items += 1;
                #[cfg(feature = "trace")]
                tracing::trace!(swaps = path.len(), "CuckooFilter::insert relocated");
                return InsertOutcome::Placed;
            }
        }

        self.rollback(&path, homeless);

        #[cfg(feature = "trace")]
        tracing::warn!(
            swaps = path.len(),
            num_items = self.num_items,
            capacity = self.capacity(),
            "CuckooFilter::insert exhausted displacement"
        );

        InsertOutcome::Exhausted
    }

    /// Undo swaps newest first. Ends with the original fingerprint in hand.
    fn rollback(&mut self, path: &[(usize, usize)], mut homeless: u64) {
        for &(index, slot) in path.iter().rev() {
            homeless = self.store.replace(index, slot, homeless);
        }
    }

    /// Test membership: the fingerprint is in either candidate bucket.
    #[must_use]
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        let p = self.fingerprinter.placement(item.as_ref());
        self.store.contains(p.index_one, p.fingerprint)
            || self.store.contains(p.index_two, p.fingerprint)
    }

    /// Remove one copy of the item's fingerprint. Returns `false` if absent.
    pub fn delete<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        let p = self.fingerprinter.placement(item.as_ref());
        let removed = self.store.remove(p.index_one, p.fingerprint)
            || self.store.remove(p.index_two, p.fingerprint);
        if removed {
            self.num_items -= 1;
        }
        removed
    }

    /// Fingerprints currently stored.
    #[must_use]
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// Slots in the table: `num_buckets × bucket_size`.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.store.num_buckets() * self.store.bucket_size()
    }

    /// Same as [`capacity`](Self::capacity); a stash adds to this.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.capacity()
    }

    /// Fraction of slots occupied.
    #[must_use]
    pub fn load_factor(&self) -> f64 {
        self.num_items as f64 / self.capacity() as f64
    }

    /// Number of buckets.
    #[must_use]
    pub fn num_buckets(&self) -> usize {
        self.store.num_buckets()
    }

    /// Slots per bucket.
    #[must_use]
    pub fn bucket_size(&self) -> usize {
        self.store.bucket_size()
    }

    /// Fingerprint width in bits.
    #[must_use]
    pub fn fingerprint_size(&self) -> u32 {
        self.store.fingerprint_size()
    }

    /// Displacement bound.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Upper bound on the false positive rate of a full table.
    #[must_use]
    pub fn expected_fp_rate(&self) -> f64 {
        params::cuckoo_fp_rate(self.fingerprint_size(), self.bucket_size())
    }

    /// The fingerprint storage.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Remove every fingerprint. The RNG state is kept.
    pub fn clear(&mut self) {
        self.store.clear();
        self.num_items = 0;
    }

    /// Bytes held by the filter.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() - std::mem::size_of::<S>() + self.store.memory_usage()
    }
}

impl<S, H, R> MembershipFilter for GenericCuckooFilter<S, H, R>
where
    S: FingerprintStore,
    H: FilterHasher,
    R: Rng,
{
    fn insert(&mut self, item: &[u8]) -> bool {
        GenericCuckooFilter::insert(self, item)
    }

    fn contains(&self, item: &[u8]) -> bool {
        GenericCuckooFilter::contains(self, item)
    }

    fn len(&self) -> usize {
        self.num_items
    }

    fn memory_usage(&self) -> usize {
        GenericCuckooFilter::memory_usage(self)
    }

    fn name(&self) -> &'static str {
        "CuckooFilter"
    }
}

impl<S, H, R> DeletableFilter for GenericCuckooFilter<S, H, R>
where
    S: FingerprintStore,
    H: FilterHasher,
    R: Rng,
{
    fn delete(&mut self, item: &[u8]) -> bool {
        GenericCuckooFilter::delete(self, item)
    }
}
