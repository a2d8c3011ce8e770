//! Core membership filter traits.
//!
//! Every filter in this crate is an approximate set over byte strings:
//!
//! 1. **No false negatives**: once `insert` reports success, `contains`
//!    returns `true` for that item (until it is deleted, where supported).
//! 2. **Bounded false positives**: unrelated items may test positive at a
//!    rate governed by the filter's parameters.
//!
//! # Trait Hierarchy
//!
//! ```text
//! MembershipFilter (insert / contains / len / memory_usage)
//!     └── DeletableFilter (delete)
//! ```
//!
//! Trait methods take `&[u8]` so the similarity tree can drive any filter
//! with k-mer slices. Concrete filters also expose inherent generic methods
//! accepting anything `AsRef<[u8]>`, so `filter.insert("GCGT")` works.

/// An approximate membership filter over byte strings.
///
/// Filters are single-writer: mutation takes `&mut self`.
pub trait MembershipFilter {
    /// Insert an item.
    ///
    /// Returns `false` if the filter could not store the item. Bloom filters
    /// always succeed; cuckoo filters fail when displacement is exhausted.
    fn insert(&mut self, item: &[u8]) -> bool;

    /// Test membership. May return false positives, never false negatives.
    fn contains(&self, item: &[u8]) -> bool;

    /// Number of items currently stored.
    fn len(&self) -> usize;

    /// Whether no items have been stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Advisory in-memory footprint in bytes.
    fn memory_usage(&self) -> usize;

    /// Short name used in logs and statistics.
    fn name(&self) -> &'static str;
}

/// A membership filter that supports removing items.
///
/// Deleting an item that was never inserted can remove a colliding
/// fingerprint belonging to another item, so callers should only delete
/// what they inserted.
pub trait DeletableFilter: MembershipFilter {
    /// Remove one copy of an item. Returns `false` if it was not found.
    fn delete(&mut self, item: &[u8]) -> bool;
}
