//! Sequencing reads, datasets and k-mer decomposition.
//!
//! A [`Dataset`] is an identifier plus an ordered list of [`Read`]s. Trees
//! only ever need two things from it: the identifier, and the lazy stream of
//! length-`k` substrings of every read. K-mers are byte windows, so they feed
//! straight into any filter's `insert`.
//!
//! ```
//! use sbtree::dataset::{kmers, Dataset};
//!
//! let dataset = Dataset::from_sequence("sample", "GCGTA");
//! let found: Vec<&[u8]> = dataset.kmers(3).collect();
//! assert_eq!(found, [b"GCG", b"CGT", b"GTA"]);
//!
//! assert_eq!(kmers("AC", 3).count(), 0);
//! ```

use std::iter::FusedIterator;

/// One sequencing read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Read {
    /// Source file the read came from.
    pub filename: String,
    /// Read identifier.
    pub id: String,
    /// Base sequence.
    pub sequence: String,
    /// Per-base quality string.
    pub quality: String,
}

impl Read {
    /// Create a read.
    pub fn new(
        filename: impl Into<String>,
        id: impl Into<String>,
        sequence: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            id: id.into(),
            sequence: sequence.into(),
            quality: quality.into(),
        }
    }

    /// Every length-`k` window of the sequence, in order.
    #[must_use]
    pub fn kmers(&self, k: usize) -> Kmers<'_> {
        Kmers::new(self.sequence.as_bytes(), k)
    }
}

impl std::fmt::Display for Read {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}\t{}\t{}", self.filename, self.id, self.sequence, self.quality)
    }
}

/// A named collection of reads.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    /// Identifier reported by tree queries.
    pub id: String,
    /// Reads in insertion order.
    pub reads: Vec<Read>,
}

impl Dataset {
    /// Create a dataset from an identifier and its reads.
    pub fn new(id: impl Into<String>, reads: Vec<Read>) -> Self {
        Self {
            id: id.into(),
            reads,
        }
    }

    /// Group reads from one file. The dataset takes the first read's
    /// filename as its identifier; `None` if `reads` is empty.
    #[must_use]
    pub fn from_reads(reads: Vec<Read>) -> Option<Self> {
        let id = reads.first()?.filename.clone();
        Some(Self { id, reads })
    }

    /// A dataset holding a single read, identified by the read id.
    #[must_use]
    pub fn from_read(read: Read) -> Self {
        Self {
            id: read.id.clone(),
            reads: vec![read],
        }
    }

    /// A dataset holding one bare sequence.
    pub fn from_sequence(id: impl Into<String>, sequence: impl Into<String>) -> Self {
        let id = id.into();
        let read = Read::new(id.clone(), id.clone(), sequence, String::new());
        Self {
            id,
            reads: vec![read],
        }
    }

    /// K-mers of every read, read by read. Restartable: each call starts over.
    pub fn kmers(&self, k: usize) -> impl Iterator<Item = &[u8]> + Clone + '_ {
        self.reads.iter().flat_map(move |read| read.kmers(k))
    }

    /// Total k-mer count across all reads.
    #[must_use]
    pub fn kmer_count(&self, k: usize) -> usize {
        self.reads.iter().map(|read| read.kmers(k).len()).sum()
    }

    /// Number of reads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Whether the dataset has no reads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }
}

/// K-mers of a plain string, such as a query.
#[must_use]
pub fn kmers(sequence: &str, k: usize) -> Kmers<'_> {
    Kmers::new(sequence.as_bytes(), k)
}

/// Iterator over the length-`k` windows of a byte sequence.
///
/// Yields nothing when `k == 0` or `k` exceeds the sequence length.
#[derive(Debug, Clone)]
pub struct Kmers<'a> {
    sequence: &'a [u8],
    k: usize,
    pos: usize,
}

impl<'a> Kmers<'a> {
    /// Windows of `sequence` of width `k`.
    #[must_use]
    pub fn new(sequence: &'a [u8], k: usize) -> Self {
        Self { sequence, k, pos: 0 }
    }

    fn remaining(&self) -> usize {
        if self.k == 0 {
            return 0;
        }
        (self.sequence.len() + 1).saturating_sub(self.k + self.pos)
    }
}

impl<'a> Iterator for Kmers<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        let kmer = &self.sequence[self.pos..self.pos + self.k];
        self.pos += 1;
        Some(kmer)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Kmers<'_> {}

impl FusedIterator for Kmers<'_> {}
