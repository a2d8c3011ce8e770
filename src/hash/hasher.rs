//! Hash function trait and the deterministic FNV-1a hasher.
//!
//! Hash functions operate on byte slices so k-mers can be hashed without
//! conversion. Every implementation must be deterministic across runs: two
//! filters built with the same configuration must agree bit-for-bit, which the
//! similarity tree relies on when it compares sibling filters.
//!
//! # Examples
//!
//! ```
//! use sbtree::hash::{FilterHasher, StdHasher};
//!
//! let hasher = StdHasher::new();
//! let h1 = hasher.hash_bytes(b"GCGT");
//! assert_eq!(h1, hasher.hash_bytes(b"GCGT"));
//!
//! // Independent rounds for Bloom probing
//! assert_ne!(hasher.hash_bytes_with_seed(b"GCGT", 0), hasher.hash_bytes_with_seed(b"GCGT", 1));
//! ```

#![allow(clippy::module_name_repetitions)]

/// Seed mixed into the second half of a wide hash.
const WIDE_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Base hasher trait for filter hash functions.
///
/// # Requirements
///
/// - **Determinism**: same input, same output, across processes
/// - **Uniform distribution** across the `u64` space
/// - **Independence** between different seeds
pub trait FilterHasher: Send + Sync {
    /// Hash arbitrary bytes to a 64-bit value.
    fn hash_bytes(&self, bytes: &[u8]) -> u64;

    /// Hash bytes with an explicit seed.
    ///
    /// Bloom filters call this once per round with `seed = round`.
    /// The default XORs the seed into the base hash; implementations with
    /// native seeding should override it.
    fn hash_bytes_with_seed(&self, bytes: &[u8], seed: u64) -> u64 {
        self.hash_bytes(bytes) ^ seed
    }

    /// Hash bytes to a 128-bit value.
    ///
    /// Cuckoo filters take the fingerprint from the low half and the bucket
    /// index from the high half, so the two stay uncorrelated.
    fn hash_bytes_wide(&self, bytes: &[u8]) -> u128 {
        let lo = self.hash_bytes(bytes);
        let hi = self.hash_bytes_with_seed(bytes, WIDE_SEED);
        (u128::from(hi) << 64) | u128::from(lo)
    }

    /// Human-readable name for logs.
    fn name(&self) -> &'static str;
}

/// FNV-1a state usable through [`std::hash::Hasher`].
#[derive(Debug, Clone)]
pub struct DeterministicHasher {
    state: u64,
}

impl DeterministicHasher {
    /// Create a new hasher with the FNV-1a offset basis.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: 0xcbf2_9ce4_8422_2325,
        }
    }
}

impl Default for DeterministicHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::hash::Hasher for DeterministicHasher {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= u64::from(byte);
            self.state = self.state.wrapping_mul(0x0100_0000_01b3);
        }
    }

    fn finish(&self) -> u64 {
        self.state
    }
}

/// Deterministic FNV-1a hasher.
///
/// Slower and weaker than [`XxHasher`](super::XxHasher) but dependency-free
/// and stable forever. Useful for reproducing results across versions.
#[derive(Debug, Clone)]
pub struct StdHasher {
    seed: u64,
}

impl StdHasher {
    /// Create a hasher with the default seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seed: 0x517c_c1b7_2722_0a95,
        }
    }

    /// Create a hasher with an explicit seed.
    ///
    /// ```
    /// use sbtree::hash::{FilterHasher, StdHasher};
    ///
    /// let h1 = StdHasher::with_seed(0).hash_bytes(b"test");
    /// let h2 = StdHasher::with_seed(42).hash_bytes(b"test");
    /// assert_ne!(h1, h2);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// FNV-1a leaves short inputs poorly mixed in the low bits, which
    /// is where `mod m` reads from. A murmur3 finalizer fixes that.
    #[inline]
    fn finalize(mut h: u64) -> u64 {
        h ^= h >> 33;
        h = h.wrapping_mul(0xff51_afd7_ed55_8ccd);
        h ^= h >> 33;
        h = h.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        h ^= h >> 33;
        h
    }
}

impl Default for StdHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterHasher for StdHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> u64 {
        use std::hash::Hasher;

        let mut hasher = DeterministicHasher::new();
        hasher.write_u64(self.seed);
        hasher.write(bytes);
        Self::finalize(hasher.finish())
    }

    #[inline]
    fn hash_bytes_with_seed(&self, bytes: &[u8], seed: u64) -> u64 {
        use std::hash::Hasher;

        let mut hasher = DeterministicHasher::new();
        hasher.write_u64(self.seed ^ seed);
        hasher.write(bytes);
        Self::finalize(hasher.finish())
    }

    #[inline]
    fn name(&self) -> &'static str {
        "StdHasher"
    }
}
