//! Bloom filter over byte strings.
//!
//! # Algorithm
//!
//! A bit array of `m` bits and `k` hash rounds. Inserting sets bit
//! `hash(item, i) mod m` for every round `i in 0..k`; a query tests the
//! same bits. No deletion, no false negatives.
//!
//! Parameters come from `(n, p)`:
//!
//! - `m = ⌈-n × ln(p) / (ln 2)²⌉`
//! - `k = ⌊(m/n) × ln 2⌋`, at least 1
//!
//! Two filters built from the same `(n, p)` and hasher have identical
//! layouts, so their bit arrays can be compared with
//! [`hamming_distance`](BloomFilter::hamming_distance) or merged with
//! [`union_with`](BloomFilter::union_with). The similarity tree relies on both.
//!
//! # Examples
//!
//! ```
//! use sbtree::filters::BloomFilter;
//!
//! let mut filter = BloomFilter::new(1000, 0.01).unwrap();
//! filter.insert("GCGT");
//! assert!(filter.contains("GCGT"));
//! assert_eq!(filter.size(), 9586);
//! assert_eq!(filter.hash_count(), 6);
//! ```

#![allow(clippy::cast_precision_loss)]

use crate::core::bitvec::BitVec;
use crate::core::filter::MembershipFilter;
use crate::core::params;
use crate::error::{Result, SbtError};
use crate::hash::{FilterHasher, XxHasher};

/// Bloom filter parameterised by `(expected_items, fp_rate)`.
#[derive(Debug, Clone)]
pub struct BloomFilter<H = XxHasher> {
    bits: BitVec,
    k: usize,
    expected_items: usize,
    target_fpr: f64,
    items_inserted: usize,
    hasher: H,
}

impl BloomFilter<XxHasher> {
    /// Create a filter sized for `expected_items` at `fpr`.
    ///
    /// # Errors
    ///
    /// - [`SbtError::InvalidItemCount`] if `expected_items == 0`
    /// - [`SbtError::FalsePositiveRateOutOfBounds`] if `fpr` not in (0, 1)
    pub fn new(expected_items: usize, fpr: f64) -> Result<Self> {
        Self::with_hasher(expected_items, fpr, XxHasher::new())
    }
}

impl<H: FilterHasher> BloomFilter<H> {
    /// Create a filter with a custom hasher.
    ///
    /// # Errors
    ///
    /// Same as [`BloomFilter::new`].
    pub fn with_hasher(expected_items: usize, fpr: f64, hasher: H) -> Result<Self> {
        let m = params::optimal_bit_count(expected_items, fpr)?;
        let k = params::optimal_hash_count(m, expected_items)?;

        #[cfg(feature = "trace")]
        tracing::debug!(
            bits = m,
            hashes = k,
            expected_items,
            fpr,
            hasher = hasher.name(),
            "BloomFilter::new"
        );

        Ok(Self {
            bits: BitVec::new(m)?,
            k,
            expected_items,
            target_fpr: fpr,
            items_inserted: 0,
            hasher,
        })
    }

    /// Number of bits `m`.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bits.len()
    }

    /// Number of hash rounds `k`.
    #[must_use]
    pub fn hash_count(&self) -> usize {
        self.k
    }

    /// Expected item count the filter was sized for.
    #[must_use]
    pub fn expected_items(&self) -> usize {
        self.expected_items
    }

    /// Target false positive rate the filter was sized for.
    #[must_use]
    pub fn target_fpr(&self) -> f64 {
        self.target_fpr
    }

    /// The underlying bit array.
    #[must_use]
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Number of bits set.
    #[must_use]
    pub fn count_set_bits(&self) -> usize {
        self.bits.count_ones()
    }

    /// Fraction of bits set, in `[0, 1]`.
    #[must_use]
    pub fn fill_rate(&self) -> f64 {
        self.count_set_bits() as f64 / self.size() as f64
    }

    /// False positive rate implied by the current fill rate: `fill^k`.
    #[must_use]
    pub fn estimated_fp_rate(&self) -> f64 {
        self.fill_rate().powi(self.k as i32)
    }

    /// Insert calls made so far, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items_inserted
    }

    /// Whether no bit is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count_set_bits() == 0
    }

    /// Insert an item. Always succeeds.
    pub fn insert<T: AsRef<[u8]> + ?Sized>(&mut self, item: &T) -> bool {
        let item = item.as_ref();
        for round in 0..self.k {
            let index = self.index(item, round);
            self.bits.set(index);
        }
        self.items_inserted += 1;
        true
    }

    /// Test membership.
    #[must_use]
    pub fn contains<T: AsRef<[u8]> + ?Sized>(&self, item: &T) -> bool {
        let item = item.as_ref();
        (0..self.k).all(|round| self.bits.get(self.index(item, round)))
    }

    /// Reset to empty.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.items_inserted = 0;
    }

    /// Merge `other` into `self` (bitwise OR).
    ///
    /// # Errors
    ///
    /// [`SbtError::IncompatibleFilters`] if sizes or hash counts differ.
    pub fn union_with(&mut self, other: &Self) -> Result<()> {
        self.check_compatible(other)?;
        self.bits.union_with(&other.bits)?;
        self.items_inserted += other.items_inserted;
        Ok(())
    }

    /// Popcount of the XOR of both bit arrays. Lower means more similar.
    ///
    /// # Errors
    ///
    /// [`SbtError::IncompatibleFilters`] if sizes or hash counts differ.
    pub fn hamming_distance(&self, other: &Self) -> Result<usize> {
        self.check_compatible(other)?;
        self.bits.hamming_distance(&other.bits)
    }

    /// Bytes held by the filter.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.bits.memory_usage() + std::mem::size_of::<Self>() - std::mem::size_of::<BitVec>()
    }

    #[inline]
    fn index(&self, item: &[u8], round: usize) -> usize {
        (self.hasher.hash_bytes_with_seed(item, round as u64) % self.bits.len() as u64) as usize
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.size() != other.size() {
            return Err(SbtError::incompatible_filters(format!(
                "size mismatch: {} vs {} bits",
                self.size(),
                other.size()
            )));
        }
        if self.k != other.k {
            return Err(SbtError::incompatible_filters(format!(
                "hash count mismatch: {} vs {}",
                self.k, other.k
            )));
        }
        Ok(())
    }
}

impl<H: FilterHasher> MembershipFilter for BloomFilter<H> {
    fn insert(&mut self, item: &[u8]) -> bool {
        BloomFilter::insert(self, item)
    }

    fn contains(&self, item: &[u8]) -> bool {
        BloomFilter::contains(self, item)
    }

    fn len(&self) -> usize {
        BloomFilter::len(self)
    }

    fn is_empty(&self) -> bool {
        BloomFilter::is_empty(self)
    }

    fn memory_usage(&self) -> usize {
        BloomFilter::memory_usage(self)
    }

    fn name(&self) -> &'static str {
        "BloomFilter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::StdHasher;

    #[test]
    fn test_parameters() {
        let filter = BloomFilter::new(100_000, 0.03).unwrap();
        assert_eq!(filter.size(), 729_845);
        assert_eq!(filter.hash_count(), 5);
        assert_eq!(filter.expected_items(), 100_000);
        assert_eq!(filter.target_fpr(), 0.03);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(BloomFilter::new(0, 0.01).is_err());
        assert!(BloomFilter::new(100, 0.0).is_err());
        assert!(BloomFilter::new(100, 1.0).is_err());
    }

    #[test]
    fn test_insert_and_contains() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        assert!(!filter.contains("GCGT"));
        assert!(filter.insert("GCGT"));
        assert!(filter.contains("GCGT"));
        assert!(filter.contains(b"GCGT"));
        assert!(filter.contains(&String::from("GCGT")));
    }

    #[test]
    fn test_no_false_negatives() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        let items: Vec<String> = (0..1000).map(|i| format!("kmer-{}", i)).collect();
        for item in &items {
            filter.insert(item);
        }
        for item in &items {
            assert!(filter.contains(item), "false negative for {}", item);
        }
    }

    #[test]
    fn test_false_positive_rate_reasonable() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        for i in 0..1000 {
            filter.insert(&format!("in-{}", i));
        }
        let false_positives = (0..10_000)
            .filter(|i| filter.contains(&format!("out-{}", i)))
            .count();
        assert!(false_positives < 300, "fp count {}", false_positives);
    }

    #[test]
    fn test_insert_sets_at_most_k_bits() {
        let mut filter = BloomFilter::new(1000, 0.01).unwrap();
        filter.insert("ACGT");
        let set = filter.count_set_bits();
        assert!(set >= 1 && set <= filter.hash_count());
    }

    #[test]
    fn test_len_counts_inserts() {
        let mut filter = BloomFilter::new(10, 0.1).unwrap();
        assert!(filter.is_empty());
        filter.insert("A");
        filter.insert("A");
        assert_eq!(filter.len(), 2);
        filter.clear();
        assert_eq!(filter.len(), 0);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_union_with() {
        let mut a = BloomFilter::new(100, 0.01).unwrap();
        let mut b = BloomFilter::new(100, 0.01).unwrap();
        a.insert("ABCD");
        b.insert("EFGH");
        a.union_with(&b).unwrap();
        assert!(a.contains("ABCD"));
        assert!(a.contains("EFGH"));
    }

    #[test]
    fn test_union_incompatible() {
        let mut a = BloomFilter::new(100, 0.01).unwrap();
        let b = BloomFilter::new(200, 0.01).unwrap();
        assert!(matches!(
            a.union_with(&b),
            Err(SbtError::IncompatibleFilters { .. })
        ));
        assert!(a.hamming_distance(&b).is_err());
    }

    #[test]
    fn test_hamming_distance() {
        let mut a = BloomFilter::new(100, 0.01).unwrap();
        let mut b = BloomFilter::new(100, 0.01).unwrap();
        assert_eq!(a.hamming_distance(&b).unwrap(), 0);
        a.insert("GCGT");
        b.insert("GCGT");
        assert_eq!(a.hamming_distance(&b).unwrap(), 0);
        b.insert("TTTT");
        assert!(a.hamming_distance(&b).unwrap() > 0);
    }

    #[test]
    fn test_custom_hasher() {
        let mut filter = BloomFilter::with_hasher(100, 0.01, StdHasher::new()).unwrap();
        filter.insert("ACGT");
        assert!(filter.contains("ACGT"));
    }

    #[test]
    fn test_fill_and_fp_estimates() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        assert_eq!(filter.fill_rate(), 0.0);
        assert_eq!(filter.estimated_fp_rate(), 0.0);
        for i in 0..100 {
            filter.insert(&format!("{}", i));
        }
        assert!(filter.fill_rate() > 0.3 && filter.fill_rate() < 0.7);
        assert!(filter.estimated_fp_rate() < 0.05);
    }

    #[test]
    fn test_trait_dispatch() {
        let mut filter = BloomFilter::new(100, 0.01).unwrap();
        let bit_bytes = filter.size() / 8;
        let dynf: &mut dyn MembershipFilter = &mut filter;
        assert!(dynf.insert(b"ACGT"));
        assert!(dynf.contains(b"ACGT"));
        assert_eq!(dynf.name(), "BloomFilter");
        assert!(dynf.memory_usage() >= bit_bytes);
    }
}
