//! Membership filter implementations.
//!
//! # Available Filters
//!
//! - [`BloomFilter`] - bit array with `k` hash rounds, no deletion
//! - [`CuckooFilter`] - two-choice hashing over one bucket object per index
//! - [`CuckooFilterBit`] - same algorithm over a single bit-packed array
//! - [`StashedCuckooFilter`] - cuckoo filter with a bounded overflow stash
//!
//! # Choosing a Filter
//!
//! | Filter | Deletion | Failure mode | Notes |
//! |--------|----------|--------------|-------|
//! | [`BloomFilter`] | No | None (FP rate grows) | Node filters compare by Hamming distance |
//! | [`CuckooFilter`] | Yes | Insert returns `false` when full | Duplicate-suppressing insert |
//! | [`CuckooFilterBit`] | Yes | Same | `fp_size` bits per slot |
//! | [`StashedCuckooFilter`] | Yes | Only once the stash is full | Stash holds raw items |
//!
//! # Examples
//!
//! ```
//! use sbtree::filters::{BloomFilter, CuckooFilterBit};
//!
//! let mut bloom = BloomFilter::new(1_000, 0.01).unwrap();
//! bloom.insert("ACGT");
//! assert!(bloom.contains("ACGT"));
//!
//! let mut cuckoo = CuckooFilterBit::new(64, 12, 4, 500).unwrap();
//! assert!(cuckoo.insert_no_duplicates("ACGT"));
//! assert!(!cuckoo.insert_no_duplicates("ACGT"));
//! assert!(cuckoo.delete("ACGT"));
//! ```

pub mod bloom;
pub mod cuckoo;
pub mod stash;

pub use bloom::BloomFilter;
pub use cuckoo::{CuckooFilter, CuckooFilterBit, GenericCuckooFilter, InsertOutcome};
pub use stash::StashedCuckooFilter;
