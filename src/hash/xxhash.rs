//! XXHash3 hasher, the default for every filter.
//!
//! Wraps the `xxhash-rust` crate, which selects SIMD paths at runtime.
//! XXH3 is fast on the short inputs k-mers produce and has a native 128-bit
//! variant, which cuckoo filters use to derive fingerprint and bucket index
//! from one pass over the item.
//!
//! # Examples
//!
//! ```
//! use sbtree::hash::{FilterHasher, XxHasher};
//!
//! let hasher = XxHasher::new();
//! let hash = hasher.hash_bytes(b"GCGTTT");
//!
//! let h1 = XxHasher::with_seed(0).hash_bytes(b"test");
//! let h2 = XxHasher::with_seed(1).hash_bytes(b"test");
//! assert_ne!(h1, h2);
//! ```

#![allow(clippy::module_name_repetitions)]

use super::hasher::FilterHasher;

use xxhash_rust::xxh3::{xxh3_128_with_seed, xxh3_64, xxh3_64_with_seed};

/// XXHash3 hasher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XxHasher {
    seed: u64,
}

impl XxHasher {
    /// Create a hasher with seed 0.
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 0 }
    }

    /// Create a hasher with an explicit seed.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// The configured seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for XxHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterHasher for XxHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        if self.seed == 0 {
            xxh3_64(bytes)
        } else {
            xxh3_64_with_seed(bytes, self.seed)
        }
    }

    #[inline]
    fn hash_bytes_with_seed(&self, bytes: &[u8], seed: u64) -> u64 {
        xxh3_64_with_seed(bytes, self.seed.wrapping_add(seed))
    }

    #[inline]
    fn hash_bytes_wide(&self, bytes: &[u8]) -> u128 {
        xxh3_128_with_seed(bytes, self.seed)
    }

    #[inline]
    fn name(&self) -> &'static str {
        "XXHash3"
    }
}
