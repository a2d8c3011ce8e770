//! Arena nodes.

use crate::core::filter::MembershipFilter;

/// Index of a node in its tree's arena.
///
/// Ids are only meaningful for the tree that issued them. Nodes are never
/// removed, so an id stays valid for the tree's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One tree node: a filter summarising every dataset beneath it.
///
/// A leaf has no children and carries the id of the dataset it was built
/// from. An internal node has two children and no dataset id.
#[derive(Debug, Clone)]
pub struct Node<F> {
    pub(crate) filter: F,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) dataset_id: Option<String>,
    pub(crate) rejected_kmers: usize,
}

impl<F: MembershipFilter> Node<F> {
    pub(crate) fn leaf(filter: F, dataset_id: String, rejected_kmers: usize) -> Self {
        Self {
            filter,
            parent: None,
            children: Vec::with_capacity(2),
            dataset_id: Some(dataset_id),
            rejected_kmers,
        }
    }

    pub(crate) fn internal(
        filter: F,
        parent: Option<NodeId>,
        children: [NodeId; 2],
        rejected_kmers: usize,
    ) -> Self {
        Self {
            filter,
            parent,
            children: children.to_vec(),
            dataset_id: None,
            rejected_kmers,
        }
    }

    /// The node's filter.
    #[must_use]
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Parent node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children, left to right.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Dataset id for a leaf, `None` for an internal node.
    #[must_use]
    pub fn dataset_id(&self) -> Option<&str> {
        self.dataset_id.as_deref()
    }

    /// Whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// K-mers this node's filter failed to store.
    #[must_use]
    pub fn rejected_kmers(&self) -> usize {
        self.rejected_kmers
    }

    /// Bytes held by the node, filter included.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() - std::mem::size_of::<F>()
            + self.filter.memory_usage()
            + self.children.capacity() * std::mem::size_of::<NodeId>()
            + self.dataset_id.as_ref().map_or(0, String::capacity)
    }
}
