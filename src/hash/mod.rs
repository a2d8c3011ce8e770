//! Hash functions and fingerprinting for filters.
//!
//! # Module Structure
//!
//! ```text
//! hash/
//! ├── hasher.rs       - FilterHasher trait and StdHasher (FNV-1a)
//! ├── xxhash.rs       - XXHash3 implementation (default)
//! ├── fingerprint.rs  - Cuckoo fingerprint / bucket-index derivation
//! └── mod.rs          - This file (public API)
//! ```
//!
//! # Choosing a Hash Function
//!
//! | Hash Function | Speed     | Use Case                                  |
//! |---------------|-----------|-------------------------------------------|
//! | [`XxHasher`]  | Very Fast | Default for every filter                  |
//! | [`StdHasher`] | Medium    | Bit-stable across crate versions          |
//!
//! Bloom filters probe `hash_bytes_with_seed(item, round) mod m` for each
//! round. Cuckoo filters go through [`Fingerprinter`].
//!
//! # Examples
//!
//! ```
//! use sbtree::hash::{FilterHasher, Fingerprinter, XxHasher};
//!
//! let fpr = Fingerprinter::new(XxHasher::new(), 64, 16);
//! let placement = fpr.placement(b"GCGT");
//! assert_eq!(fpr.alt_index(placement.index_two, placement.fingerprint), placement.index_one);
//! ```

pub mod fingerprint;
pub mod hasher;
pub mod xxhash;

pub use fingerprint::{Fingerprinter, Placement};
pub use hasher::{DeterministicHasher, FilterHasher, StdHasher};
pub use xxhash::XxHasher;

/// Hasher used when none is specified.
pub type DefaultHasher = XxHasher;
