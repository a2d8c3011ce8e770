//! Fingerprint and bucket-index derivation for cuckoo filters.
//!
//! An item is hashed once to 128 bits. The low half, masked to `fp_size`
//! bits, is the fingerprint. The high half modulo the bucket count is the
//! primary bucket. The alternate bucket is derived from the primary bucket
//! and the fingerprint alone, so an evicted fingerprint can be relocated
//! without the original item:
//!
//! ```text
//! fp        = low64(hash(item)) & mask(fp_size)
//! index_one = high64(hash(item)) mod num_buckets
//! index_two = alt(index_one, fp)
//! alt(alt(i, fp), fp) == i
//! ```
//!
//! For power-of-two tables `alt` is `i XOR (hash(fp) mod n | 1)`. For
//! other sizes plain XOR is not an involution, so `alt` reflects the index
//! around an odd offset: `(o - i) mod n` with `o = hash(fp) mod n | 1`.
//! Forcing the offset odd means no index maps to itself on even-sized
//! tables; odd-sized tables have exactly one such index per fingerprint.

use super::hasher::FilterHasher;

/// Fingerprint, primary bucket and alternate bucket of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Masked fingerprint.
    pub fingerprint: u64,
    /// Primary bucket.
    pub index_one: usize,
    /// Alternate bucket.
    pub index_two: usize,
}

/// Maps items to fingerprints and candidate buckets for one table layout.
#[derive(Debug, Clone)]
pub struct Fingerprinter<H> {
    hasher: H,
    num_buckets: usize,
    fp_mask: u64,
}

impl<H: FilterHasher> Fingerprinter<H> {
    /// Create a fingerprinter for `num_buckets` buckets of `fp_size`-bit
    /// fingerprints. Callers validate both beforehand.
    #[must_use]
    pub fn new(hasher: H, num_buckets: usize, fp_size: u32) -> Self {
        let fp_mask = if fp_size >= 64 {
            u64::MAX
        } else {
            (1u64 << fp_size) - 1
        };
        Self {
            hasher,
            num_buckets,
            fp_mask,
        }
    }

    /// The underlying hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Masked fingerprint of an item.
    #[inline]
    pub fn fingerprint(&self, item: &[u8]) -> u64 {
        (self.hasher.hash_bytes_wide(item) as u64) & self.fp_mask
    }

    /// Fingerprint and both candidate buckets of an item.
    #[inline]
    pub fn placement(&self, item: &[u8]) -> Placement {
        let wide = self.hasher.hash_bytes_wide(item);
        let fingerprint = (wide as u64) & self.fp_mask;
        let index_one = ((wide >> 64) as u64 % self.num_buckets as u64) as usize;
        Placement {
            fingerprint,
            index_one,
            index_two: self.alt_index(index_one, fingerprint),
        }
    }

    /// The other candidate bucket of `fingerprint` when it sits in `index`.
    #[inline]
    pub fn alt_index(&self, index: usize, fingerprint: u64) -> usize {
        let n = self.num_buckets as u64;
        if n == 1 {
            return 0;
        }
        let offset = (self.hasher.hash_bytes(&fingerprint.to_le_bytes()) % n) | 1;
        let index = index as u64;
        let alt = if n.is_power_of_two() {
            index ^ offset
        } else {
            // offset | 1 may equal n when n is odd
            let offset = offset % n;
            (offset + n - index) % n
        };
        alt as usize
    }
}
