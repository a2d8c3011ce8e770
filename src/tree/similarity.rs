//! Incremental similarity tree over datasets.
//!
//! # Insertion
//!
//! A new dataset becomes a leaf whose filter holds all of its k-mers. The
//! leaf is placed by walking down from the root:
//!
//! - At a **leaf**, split: a new internal node takes the leaf's place, with a
//!   filter cloned from the leaf plus the new dataset's k-mers, and children
//!   `[old leaf, new leaf]`.
//! - At an **internal node**, add the dataset's k-mers to its filter, then
//!   either attach the new leaf (one child) or descend into the child with
//!   the lower [`dissimilarity`](NodeFilter::dissimilarity) (two children,
//!   ties go left).
//!
//! Every internal filter therefore contains every k-mer stored in its
//! subtree. There is no rebalancing.
//!
//! # Query
//!
//! Breadth-first from the root. At each node, count how many query k-mers the
//! filter contains; if `found >= theta × total` the node passes, its children
//! are queued left to right, and a passing leaf reports its dataset id.
//! A failing node prunes its whole subtree.

#![allow(clippy::cast_precision_loss)]

use super::config::TreeConfig;
use super::node::{Node, NodeId};
use super::node_filter::NodeFilter;
use crate::dataset::{kmers, Dataset};
use crate::error::{Result, SbtError};
use std::collections::VecDeque;

/// Traversal counters from one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Nodes whose filter was tested.
    pub visited: usize,
    /// Tested nodes that fell below the threshold.
    pub pruned: usize,
    /// Query k-mers tested per node.
    pub query_kmers: usize,
}

/// Statistics about the tree structure and usage.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeStats {
    /// Total number of nodes (internal + leaf).
    pub total_nodes: usize,
    /// Number of leaves, one per dataset.
    pub leaf_count: usize,
    /// Number of levels; 0 for an empty tree.
    pub depth: usize,
    /// Bytes currently held by all nodes.
    pub memory_usage: usize,
    /// Running size total accumulated as nodes were created.
    pub aggregate_size: usize,
    /// Items stored across leaf filters.
    pub total_items: usize,
    /// K-mers rejected by full filters, over all nodes.
    pub rejected_kmers: usize,
    /// Mean filter occupancy across all nodes.
    pub avg_occupancy: f64,
    /// Memory usage per node (average).
    pub memory_per_node: usize,
    /// Overhead factor (total_nodes / leaf_count).
    pub overhead_factor: f64,
}

/// Binary tree of filters over datasets.
///
/// Nodes live in an arena owned by the tree and refer to each other by
/// [`NodeId`]. See the [module docs](self) for the algorithms.
///
/// # Examples
///
/// ```
/// use sbtree::builder::FilterConfig;
/// use sbtree::dataset::Dataset;
/// use sbtree::tree::{BloomTree, TreeConfig};
///
/// let config = TreeConfig::new(0.5, 3, FilterConfig::bloom(100, 0.01)).unwrap();
/// let mut tree = BloomTree::new(config).unwrap();
/// tree.insert(&Dataset::from_sequence("gcgt", "GCGT")).unwrap();
///
/// assert_eq!(tree.query("GCGT"), ["gcgt"]);
/// assert!(tree.query("AAAA").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SimilarityTree<F> {
    config: TreeConfig,
    nodes: Vec<Node<F>>,
    root: Option<NodeId>,
    aggregate_size: usize,
}

impl<F: NodeFilter> SimilarityTree<F> {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `theta` or `k` is out of range, or if the node
    /// filter configuration is invalid for `F`.
    pub fn new(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        F::validate_config(&config.filter)?;

        #[cfg(feature = "trace")]
        tracing::debug!(theta = config.theta, k = config.k, "SimilarityTree::new");

        Ok(Self {
            config,
            nodes: Vec::new(),
            root: None,
            aggregate_size: std::mem::size_of::<Self>(),
        })
    }

    /// Insert a dataset and return its new leaf.
    ///
    /// The leaf's position is found before anything is written, so on error
    /// the tree is unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the leaf filter cannot be built or if two node
    /// filters turn out to be incomparable.
    pub fn insert(&mut self, dataset: &Dataset) -> Result<NodeId> {
        let k = self.config.k;
        let mut filter = F::build(&self.config.filter)?;
        let rejected = add_kmers(&mut filter, dataset, k);

        let Some(root) = self.root else {
            let leaf = self.push(Node::leaf(filter, dataset.id.clone(), rejected));
            self.root = Some(leaf);
            #[cfg(feature = "trace")]
            tracing::debug!(dataset = %dataset.id, "SimilarityTree::insert root leaf");
            return Ok(leaf);
        };

        // Internal nodes on the way down, then the node the leaf hangs off.
        let mut path = Vec::new();
        let mut current = root;
        while self.nodes[current.0].children.len() == 2 {
            path.push(current);
            current = self.closer_child(current, &filter, dataset)?;
        }

        let leaf = self.push(Node::leaf(filter, dataset.id.clone(), rejected));
        for &node in &path {
            self.absorb(node, dataset);
        }

        if self.nodes[current.0].is_leaf() {
            self.split(current, leaf, dataset);
        } else {
            self.absorb(current, dataset);
            self.nodes[current.0].children.push(leaf);
            self.nodes[leaf.0].parent = Some(current);
        }
        Ok(leaf)
    }

    /// Replace leaf `current` by an internal node over `[current, leaf]`.
    fn split(&mut self, current: NodeId, leaf: NodeId, dataset: &Dataset) {
        let mut filter = self.nodes[current.0].filter.clone();
        let rejected = add_kmers(&mut filter, dataset, self.config.k);
        let parent = self.nodes[current.0].parent;
        let internal = self.push(Node::internal(filter, parent, [current, leaf], rejected));

        self.nodes[current.0].parent = Some(internal);
        self.nodes[leaf.0].parent = Some(internal);
        match parent {
            None => self.root = Some(internal),
            Some(p) => {
                for child in &mut self.nodes[p.0].children {
                    if *child == current {
                        *child = internal;
                    }
                }
            }
        }

        #[cfg(feature = "trace")]
        tracing::debug!(
            internal = %internal,
            left = %current,
            right = %leaf,
            dataset = %dataset.id,
            nodes = self.nodes.len(),
            "SimilarityTree::insert split"
        );
    }

    fn absorb(&mut self, node: NodeId, dataset: &Dataset) {
        let k = self.config.k;
        let node = &mut self.nodes[node.0];
        node.rejected_kmers += add_kmers(&mut node.filter, dataset, k);
    }

    fn closer_child(&self, node: NodeId, leaf_filter: &F, dataset: &Dataset) -> Result<NodeId> {
        let children = &self.nodes[node.0].children;
        let (left, right) = (children[0], children[1]);
        let k = self.config.k;
        let score_left = self.nodes[left.0]
            .filter
            .dissimilarity(leaf_filter, dataset.kmers(k))?;
        let score_right = self.nodes[right.0]
            .filter
            .dissimilarity(leaf_filter, dataset.kmers(k))?;

        #[cfg(feature = "trace")]
        tracing::trace!(node = %node, score_left, score_right, "SimilarityTree::insert descend");

        Ok(if score_left <= score_right { left } else { right })
    }

    fn push(&mut self, node: Node<F>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.aggregate_size += node.memory_usage();
        self.nodes.push(node);
        id
    }

    /// Dataset ids whose leaves pass the threshold, in breadth-first order.
    #[must_use]
    pub fn query(&self, query: &str) -> Vec<String> {
        self.query_with_stats(query).0
    }

    /// Same as [`query`](Self::query).
    #[must_use]
    pub fn contains(&self, query: &str) -> Vec<String> {
        self.query(query)
    }

    /// [`query`](Self::query) plus traversal counters.
    #[must_use]
    pub fn query_with_stats(&self, query: &str) -> (Vec<String>, QueryStats) {
        let k = self.config.k;
        let total = kmers(query, k).len();
        let needed = self.config.theta * total as f64;
        let mut stats = QueryStats {
            query_kmers: total,
            ..QueryStats::default()
        };
        let mut out = Vec::new();

        let mut queue: VecDeque<NodeId> = self.root.into_iter().collect();
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id.0];
            stats.visited += 1;
            let found = kmers(query, k)
                .filter(|kmer| node.filter.contains(kmer))
                .count();
            if (found as f64) < needed {
                stats.pruned += 1;
                continue;
            }
            queue.extend(node.children.iter().copied());
            if let Some(dataset_id) = &node.dataset_id {
                out.push(dataset_id.clone());
            }
        }

        #[cfg(feature = "trace")]
        tracing::debug!(
            kmers = total,
            visited = stats.visited,
            pruned = stats.pruned,
            matches = out.len(),
            "SimilarityTree::query"
        );

        (out, stats)
    }

    /// The tree configuration.
    #[must_use]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Root node, `None` while empty.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<F>> {
        self.nodes.get(id.0)
    }

    /// All nodes with their ids, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<F>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Whether no dataset has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes, internal and leaf.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves, which equals the number of inserted datasets.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Number of levels; 0 when empty, 1 for a lone root.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut level: Vec<NodeId> = self.root.into_iter().collect();
        while !level.is_empty() {
            depth += 1;
            level = level
                .iter()
                .flat_map(|id| self.nodes[id.0].children.iter().copied())
                .collect();
        }
        depth
    }

    /// Running size total: the tree itself plus every node at creation time.
    /// Never decreases.
    #[must_use]
    pub fn aggregate_size(&self) -> usize {
        self.aggregate_size
    }

    /// Summary statistics.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let total_nodes = self.node_count();
        let leaf_count = self.leaf_count();
        let memory_usage: usize = self.nodes.iter().map(Node::memory_usage).sum();
        let occupancy: f64 = self.nodes.iter().map(|n| n.filter.occupancy()).sum();

        TreeStats {
            total_nodes,
            leaf_count,
            depth: self.depth(),
            memory_usage,
            aggregate_size: self.aggregate_size,
            total_items: self
                .nodes
                .iter()
                .filter(|n| n.is_leaf())
                .map(|n| n.filter.len())
                .sum(),
            rejected_kmers: self.nodes.iter().map(|n| n.rejected_kmers).sum(),
            avg_occupancy: if total_nodes == 0 {
                0.0
            } else {
                occupancy / total_nodes as f64
            },
            memory_per_node: memory_usage.checked_div(total_nodes).unwrap_or(0),
            overhead_factor: if leaf_count == 0 {
                0.0
            } else {
                total_nodes as f64 / leaf_count as f64
            },
        }
    }

    /// Check the structural invariants: every node is reachable once from
    /// the root, parent links mirror child links, internal nodes have two
    /// children, and exactly the leaves carry a dataset id.
    ///
    /// # Errors
    ///
    /// [`SbtError::InternalError`] describing the first violation found.
    pub fn validate_structure(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.nodes.is_empty() {
                return Ok(());
            }
            return Err(SbtError::internal_error(format!(
                "empty tree holds {} nodes",
                self.nodes.len()
            )));
        };
        if let Some(parent) = self.nodes[root.0].parent {
            return Err(SbtError::internal_error(format!(
                "root {} has parent {}",
                root, parent
            )));
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let node = self
                .nodes
                .get(id.0)
                .ok_or_else(|| SbtError::index_out_of_bounds(id.0, self.nodes.len()))?;
            if std::mem::replace(&mut seen[id.0], true) {
                return Err(SbtError::internal_error(format!("node {} reached twice", id)));
            }
            match (node.children.len(), node.dataset_id.is_some()) {
                (0, true) | (2, false) => {}
                (children, has_id) => {
                    return Err(SbtError::internal_error(format!(
                        "node {} has {} children and dataset id present = {}",
                        id, children, has_id
                    )));
                }
            }
            for &child in &node.children {
                let child_parent = self.nodes.get(child.0).and_then(|c| c.parent);
                if child_parent != Some(id) {
                    return Err(SbtError::internal_error(format!(
                        "child {} of {} points to parent {:?}",
                        child, id, child_parent
                    )));
                }
                queue.push_back(child);
            }
        }

        match seen.iter().position(|&s| !s) {
            Some(orphan) => Err(SbtError::internal_error(format!(
                "node {} unreachable from root",
                NodeId(orphan)
            ))),
            None => Ok(()),
        }
    }
}

/// Add every k-mer of `dataset` to `filter`; returns how many were rejected.
fn add_kmers<F: NodeFilter>(filter: &mut F, dataset: &Dataset, k: usize) -> usize {
    let rejected = dataset
        .kmers(k)
        .filter(|kmer| !filter.insert_kmer(kmer))
        .count();

    #[cfg(feature = "trace")]
    if rejected > 0 {
        tracing::warn!(
            dataset = %dataset.id,
            rejected,
            filter = filter.name(),
            "node filter rejected k-mers"
        );
    }

    rejected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FilterConfig;
    use crate::filters::{BloomFilter, CuckooFilter};

    fn bloom_tree(theta: f64, k: usize) -> SimilarityTree<BloomFilter> {
        SimilarityTree::new(TreeConfig::new(theta, k, FilterConfig::bloom(100, 0.01)).unwrap())
            .unwrap()
    }

    fn cuckoo_tree(theta: f64, k: usize) -> SimilarityTree<CuckooFilter> {
        let filter = FilterConfig::manual(64, 16, 4).with_seed(7);
        SimilarityTree::new(TreeConfig::new(theta, k, filter).unwrap()).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let tree = bloom_tree(0.5, 3);
        assert!(tree.is_empty());
        assert!(tree.query("GCGT").is_empty());
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.validate_structure().is_ok());
        assert_eq!(tree.aggregate_size(), std::mem::size_of::<SimilarityTree<BloomFilter>>());
    }

    #[test]
    fn test_single_leaf() {
        let mut tree = bloom_tree(0.5, 3);
        let leaf = tree.insert(&Dataset::from_sequence("d", "GCGT")).unwrap();
        assert_eq!(tree.root(), Some(leaf));
        assert_eq!(tree.query("GCGT"), ["d"]);
        assert!(tree.query("AAAA").is_empty());
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_split_on_second_insert() {
        let mut tree = bloom_tree(0.5, 2);
        let first = tree.insert(&Dataset::from_sequence("a", "ABCD")).unwrap();
        let second = tree.insert(&Dataset::from_sequence("b", "EFGH")).unwrap();
        let root = tree.root().unwrap();
        let root_node = tree.node(root).unwrap();
        assert_eq!(root_node.children(), &[first, second]);
        assert_eq!(root_node.dataset_id(), None);
        assert_eq!(tree.node(first).unwrap().parent(), Some(root));
        assert_eq!(tree.node(second).unwrap().parent(), Some(root));
        assert!(tree.validate_structure().is_ok());
    }

    #[test]
    fn test_failed_insert_leaves_tree_unchanged() {
        let mut tree = bloom_tree(0.5, 3);
        tree.insert(&Dataset::from_sequence("a", "ACGTAC")).unwrap();
        tree.insert(&Dataset::from_sequence("b", "TTGACC")).unwrap();
        let root = tree.root().unwrap();
        let root_bits = tree.node(root).unwrap().filter().count_set_bits();
        let size_before = tree.aggregate_size();

        // A leaf of a different size cannot be scored against the children
        tree.config.filter = FilterConfig::bloom(5000, 0.01);
        let result = tree.insert(&Dataset::from_sequence("c", "GGGCCA"));
        assert!(matches!(result, Err(SbtError::IncompatibleFilters { .. })));

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.aggregate_size(), size_before);
        assert_eq!(tree.node(root).unwrap().filter().count_set_bits(), root_bits);
        assert!(tree.validate_structure().is_ok());
        assert!(tree.query("GGGCCA").is_empty());
    }

    #[test]
    fn test_internal_filter_covers_subtree() {
        let mut tree = cuckoo_tree(1.0, 3);
        let sequences = ["ACGTAC", "TTGACC", "GGGCCA", "CATCAT"];
        for (i, seq) in sequences.iter().enumerate() {
            tree.insert(&Dataset::from_sequence(format!("d{}", i), *seq)).unwrap();
        }
        let root = tree.node(tree.root().unwrap()).unwrap();
        for seq in sequences {
            for kmer in kmers(seq, 3) {
                assert!(root.filter().contains(kmer));
            }
        }
    }

    #[test]
    fn test_aggregate_size_grows() {
        let mut tree = bloom_tree(0.5, 3);
        let mut last = tree.aggregate_size();
        for seq in ["AAAC", "CCCG", "GGGT"] {
            tree.insert(&Dataset::from_sequence(seq, seq)).unwrap();
            assert!(tree.aggregate_size() > last);
            last = tree.aggregate_size();
        }
    }

    #[test]
    fn test_stats() {
        let mut tree = cuckoo_tree(0.5, 3);
        for seq in ["ACGTAC", "TTGACC", "GGGCCA"] {
            tree.insert(&Dataset::from_sequence(seq, seq)).unwrap();
        }
        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 5);
        assert_eq!(stats.leaf_count, 3);
        assert_eq!(stats.total_items, 12);
        assert_eq!(stats.rejected_kmers, 0);
        assert!(stats.depth >= 2);
        assert!(stats.avg_occupancy > 0.0);
        assert!((stats.overhead_factor - 5.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_query_stats_prune() {
        let mut tree = bloom_tree(1.0, 3);
        tree.insert(&Dataset::from_sequence("a", "AAAAAA")).unwrap();
        tree.insert(&Dataset::from_sequence("c", "CCCCCC")).unwrap();
        let (hits, stats) = tree.query_with_stats("TTTTTT");
        assert!(hits.is_empty());
        assert_eq!(stats.visited, 1);
        assert_eq!(stats.pruned, 1);
        assert_eq!(stats.query_kmers, 4);
    }

    #[test]
    fn test_theta_zero_visits_everything() {
        let mut tree = bloom_tree(0.0, 3);
        for seq in ["AAAC", "CCCG", "GGGT"] {
            tree.insert(&Dataset::from_sequence(seq, seq)).unwrap();
        }
        let (hits, stats) = tree.query_with_stats("TTTT");
        assert_eq!(hits.len(), 3);
        assert_eq!(stats.visited, tree.node_count());
        assert_eq!(stats.pruned, 0);
    }

    #[test]
    fn test_rejected_kmers_counted() {
        let filter = FilterConfig::manual(1, 32, 1).with_max_iter(2).with_seed(0);
        let mut tree: SimilarityTree<CuckooFilter> =
            SimilarityTree::new(TreeConfig::new(0.5, 2, filter).unwrap()).unwrap();
        let leaf = tree.insert(&Dataset::from_sequence("d", "ACGT")).unwrap();
        assert_eq!(tree.node(leaf).unwrap().rejected_kmers(), 2);
        assert_eq!(tree.stats().rejected_kmers, 2);
    }

    #[test]
    fn test_new_rejects_bad_filter_config() {
        let config = TreeConfig::new(0.5, 3, FilterConfig::manual(10, 8, 1)).unwrap();
        assert!(SimilarityTree::<BloomFilter>::new(config.clone()).is_err());
        assert!(SimilarityTree::<CuckooFilter>::new(config).is_ok());
    }
}
