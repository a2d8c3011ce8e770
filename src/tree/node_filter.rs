//! The filter contract a similarity tree node needs.

use crate::bucket::FingerprintStore;
use crate::builder::cuckoo::{build_filter, build_stashed, validate_unstashed};
use crate::builder::FilterConfig;
use crate::core::filter::MembershipFilter;
use crate::error::Result;
use crate::filters::{BloomFilter, GenericCuckooFilter, InsertOutcome, StashedCuckooFilter};
use crate::hash::XxHasher;
use rand::rngs::StdRng;

/// A membership filter that can summarise one node of a similarity tree.
///
/// Every node of a tree is built from the same [`FilterConfig`], so any two
/// node filters share a layout and can be compared.
pub trait NodeFilter: MembershipFilter + Clone {
    /// Build an empty node filter.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not describe a valid filter of this
    /// kind.
    fn build(config: &FilterConfig) -> Result<Self>;

    /// Check `config` without allocating a filter.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    fn validate_config(config: &FilterConfig) -> Result<()>;

    /// Add one k-mer. Returns `false` only when the filter could not store
    /// it; a k-mer that is already present counts as stored.
    fn insert_kmer(&mut self, kmer: &[u8]) -> bool;

    /// Distance between this node and a new dataset: lower means the
    /// dataset fits better beneath this node.
    ///
    /// `leaf` is the dataset's freshly built leaf filter and `kmers` its
    /// k-mer stream; each filter kind uses whichever it compares by.
    ///
    /// # Errors
    ///
    /// Returns an error if `leaf` has an incompatible layout.
    fn dissimilarity<'a, I>(&self, leaf: &Self, kmers: I) -> Result<usize>
    where
        I: Iterator<Item = &'a [u8]>;

    /// Occupancy in `[0, 1]`: bit fill for Bloom, slot load for cuckoo.
    fn occupancy(&self) -> f64;
}

/// Bloom nodes compare by the Hamming distance between bit arrays.
impl NodeFilter for BloomFilter<XxHasher> {
    fn build(config: &FilterConfig) -> Result<Self> {
        let (expected_num, fp_prob) = config.bloom_sizing()?;
        BloomFilter::new(expected_num, fp_prob)
    }

    fn validate_config(config: &FilterConfig) -> Result<()> {
        config.bloom_sizing().map(|_| ())
    }

    fn insert_kmer(&mut self, kmer: &[u8]) -> bool {
        self.insert(kmer)
    }

    fn dissimilarity<'a, I>(&self, leaf: &Self, _kmers: I) -> Result<usize>
    where
        I: Iterator<Item = &'a [u8]>,
    {
        self.hamming_distance(leaf)
    }

    fn occupancy(&self) -> f64 {
        self.fill_rate()
    }
}

/// Count the k-mers a node does not already contain.
fn missing_kmers<'a, F, I>(filter: &F, kmers: I) -> usize
where
    F: MembershipFilter + ?Sized,
    I: Iterator<Item = &'a [u8]>,
{
    kmers.filter(|kmer| !filter.contains(kmer)).count()
}

impl<S> NodeFilter for GenericCuckooFilter<S, XxHasher, StdRng>
where
    S: FingerprintStore,
{
    fn build(config: &FilterConfig) -> Result<Self> {
        build_filter::<S>(config)
    }

    fn validate_config(config: &FilterConfig) -> Result<()> {
        validate_unstashed(config)
    }

    fn insert_kmer(&mut self, kmer: &[u8]) -> bool {
        !matches!(self.try_insert(kmer, true), InsertOutcome::Exhausted)
    }

    fn dissimilarity<'a, I>(&self, _leaf: &Self, kmers: I) -> Result<usize>
    where
        I: Iterator<Item = &'a [u8]>,
    {
        Ok(missing_kmers(self, kmers))
    }

    fn occupancy(&self) -> f64 {
        self.load_factor()
    }
}

impl<S> NodeFilter for StashedCuckooFilter<S, XxHasher, StdRng>
where
    S: FingerprintStore,
{
    fn build(config: &FilterConfig) -> Result<Self> {
        build_stashed::<S>(config)
    }

    fn validate_config(config: &FilterConfig) -> Result<()> {
        config.validate()
    }

    fn insert_kmer(&mut self, kmer: &[u8]) -> bool {
        !matches!(self.try_insert(kmer, true), InsertOutcome::Exhausted)
    }

    fn dissimilarity<'a, I>(&self, _leaf: &Self, kmers: I) -> Result<usize>
    where
        I: Iterator<Item = &'a [u8]>,
    {
        Ok(missing_kmers(self, kmers))
    }

    #[allow(clippy::cast_precision_loss)]
    fn occupancy(&self) -> f64 {
        self.num_items() as f64 / self.total_capacity() as f64
    }
}
