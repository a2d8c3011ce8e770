//! Similarity trees: binary trees of filters over sequence datasets.
//!
//! ```text
//! tree/
//! ├── config.rs       - TreeConfig (theta, k, node filter config)
//! ├── node.rs         - arena node and NodeId
//! ├── node_filter.rs  - NodeFilter: what a filter must offer a node
//! └── similarity.rs   - SimilarityTree insertion and query
//! ```
//!
//! # Variants
//!
//! | Alias | Node filter | Child selection |
//! |-------|-------------|-----------------|
//! | [`BloomTree`] | [`BloomFilter`] | Hamming distance to the new leaf |
//! | [`CuckooTree`] | [`CuckooFilter`] | Dataset k-mers missing from the child |
//! | [`CuckooBitTree`] | [`CuckooFilterBit`] | Same |
//! | [`StashedCuckooTree`] | [`StashedCuckooFilter`] | Same |
//!
//! # Examples
//!
//! ```
//! use sbtree::builder::FilterConfig;
//! use sbtree::dataset::Dataset;
//! use sbtree::tree::{CuckooBitTree, TreeConfig};
//!
//! let filter = FilterConfig::manual(64, 16, 4).with_seed(1);
//! let mut tree = CuckooBitTree::new(TreeConfig::new(0.9, 3, filter).unwrap()).unwrap();
//! tree.insert(&Dataset::from_sequence("a", "ACGTACGT")).unwrap();
//! tree.insert(&Dataset::from_sequence("b", "TTTTGGGG")).unwrap();
//!
//! assert_eq!(tree.query("GTACG"), ["a"]);
//! assert_eq!(tree.leaf_count(), 2);
//! ```

mod config;
mod node;
mod node_filter;
mod similarity;

pub use config::TreeConfig;
pub use node::{Node, NodeId};
pub use node_filter::NodeFilter;
pub use similarity::{QueryStats, SimilarityTree, TreeStats};

use crate::bucket::PackedBucketArray;
use crate::filters::{BloomFilter, CuckooFilter, CuckooFilterBit, StashedCuckooFilter};

/// Tree of Bloom filters.
pub type BloomTree = SimilarityTree<BloomFilter>;

/// Tree of bucket-array cuckoo filters.
pub type CuckooTree = SimilarityTree<CuckooFilter>;

/// Tree of bit-packed cuckoo filters.
pub type CuckooBitTree = SimilarityTree<CuckooFilterBit>;

/// Tree of cuckoo filters with overflow stashes.
pub type StashedCuckooTree = SimilarityTree<StashedCuckooFilter>;

/// Tree of bit-packed cuckoo filters with overflow stashes.
pub type StashedCuckooBitTree = SimilarityTree<StashedCuckooFilter<PackedBucketArray>>;
