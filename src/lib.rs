//! sbtree: approximate-membership filters and sequence similarity trees.
//!
//! sbtree provides Bloom and Cuckoo filters over byte strings and assembles
//! them into binary similarity trees for approximate k-mer search across many
//! sequence datasets, in the style of a simplified Sequence Bloom Tree.
//!
//! # Filters
//!
//! ```
//! use sbtree::filters::{BloomFilter, CuckooFilter};
//!
//! let mut bloom = BloomFilter::new(10_000, 0.01).unwrap();
//! bloom.insert("GATTACA");
//! assert!(bloom.contains("GATTACA"));
//!
//! let mut cuckoo = CuckooFilter::auto(10_000, 0.01, 500).unwrap();
//! assert!(cuckoo.insert("GATTACA"));
//! assert!(cuckoo.delete("GATTACA"));
//! ```
//!
//! # Similarity Trees
//!
//! A dataset is summarised by a filter holding all of its k-mers. The tree
//! groups similar datasets under shared internal filters, so a query only
//! descends into subtrees that contain at least a `theta` fraction of its
//! k-mers.
//!
//! ```
//! use sbtree::prelude::*;
//!
//! let config = TreeConfig::new(0.5, 3, FilterConfig::bloom(1_000, 0.01)).unwrap();
//! let mut tree = BloomTree::new(config).unwrap();
//! tree.insert(&Dataset::from_sequence("sample-1", "ACGTTGCA")).unwrap();
//! tree.insert(&Dataset::from_sequence("sample-2", "GGGGCCCC")).unwrap();
//!
//! assert_eq!(tree.query("CGTTG"), ["sample-1"]);
//! ```
//!
//! # Choosing a Filter
//!
//! | Filter | Deletion | Insert can fail | Memory |
//! |--------|----------|-----------------|--------|
//! | `BloomFilter` | No | No | `m` bits |
//! | `CuckooFilter` | Yes | When full | One `Vec` per bucket |
//! | `CuckooFilterBit` | Yes | When full | `fp_size` bits per slot |
//! | `StashedCuckooFilter` | Yes | When full and stash full | Table plus raw items |
//!
//! # Features
//!
//! - `trace` (default) - structured logging through `tracing`
//! - `serde` - `Serialize`/`Deserialize` for configuration and dataset types
//!
//! The library never installs a `tracing` subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::len_without_is_empty)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Fingerprint storage for cuckoo filters
pub mod bucket;

/// Builders and filter configuration
pub mod builder;

/// Core data structures, traits and parameter math
pub mod core;

/// Reads, datasets and k-mer iteration
pub mod dataset;

/// Error types and result aliases
pub mod error;

/// Filter implementations
pub mod filters;

/// Hash functions and fingerprinting
pub mod hash;

/// Similarity trees
pub mod tree;

pub use error::{Result, SbtError};

pub use core::filter::{DeletableFilter, MembershipFilter};

pub use filters::{
    BloomFilter, CuckooFilter, CuckooFilterBit, GenericCuckooFilter, InsertOutcome,
    StashedCuckooFilter,
};

pub use builder::{BloomFilterBuilder, CuckooFilterBuilder, FilterConfig};

pub use dataset::{Dataset, Read};

pub use hash::FilterHasher;

pub use tree::{BloomTree, CuckooBitTree, CuckooTree, SimilarityTree, TreeConfig};

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use sbtree::prelude::*;
///
/// let mut filter = CuckooFilterBit::new(64, 12, 4, 500).unwrap();
/// assert!(filter.insert("ACGT"));
/// assert!(filter.contains("ACGT"));
/// ```
pub mod prelude {
    pub use crate::core::filter::{DeletableFilter, MembershipFilter};
    pub use crate::error::{Result, SbtError};
    pub use crate::filters::{
        BloomFilter, CuckooFilter, CuckooFilterBit, InsertOutcome, StashedCuckooFilter,
    };

    pub use crate::builder::{BloomFilterBuilder, CuckooFilterBuilder, FilterConfig};
    pub use crate::dataset::{kmers, Dataset, Read};
    pub use crate::hash::{FilterHasher, StdHasher, XxHasher};

    pub use crate::tree::{
        BloomTree, CuckooBitTree, CuckooTree, NodeFilter, NodeId, SimilarityTree,
        StashedCuckooTree, TreeConfig,
    };
}
