//! Merkle tree data model.
//!
//! All nodes of a tree live in one arena owned by [`MerkleTree`] and refer to
//! each other through [`NodeId`]s. Child links define the tree; parent and
//! duplicate links are plain back-references that carry no ownership, so the
//! structure has no reference cycles and is dropped in one piece.
//!
//! Nodes are stored in creation order: the leaf level first (left to right,
//! padding included), then each level above it, with the root last.
//!
//! ```text
//!         root = h(p0 + p1)
//!        /                \
//!  p0 = h(a + b)     p1 = h(c + c')
//!   /        \         /       \
//!  a          b       c         c'   ← c' duplicates c
//! ```
//!
//! A duplicate above the leaf level shares the children of the node it
//! copies, so every path from the root reaches the leaf level. The children's
//! parent link names the original only.

mod builder;


use std::slice;

use bytes::Bytes;

use crate::error::Result;

pub use builder::{TreeBuilder, generate_merkle_tree};

/// Handle to a node inside a [`MerkleTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the tree's arena
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A single node of a [`MerkleTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    hash: Bytes,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
    duplicate_of: Option<NodeId>,
}

impl Node {
    pub(crate) const fn leaf(hash: Bytes) -> Self {
        Self {
            hash,
            left: None,
            right: None,
            parent: None,
            duplicate_of: None,
        }
    }

    pub(crate) const fn internal(hash: Bytes, left: NodeId, right: NodeId) -> Self {
        Self {
            hash,
            left: Some(left),
            right: Some(right),
            parent: None,
            duplicate_of: None,
        }
    }

    /// A padding copy of `original`: same hash and children, no parent yet.
    ///
    /// The children keep pointing at `original` as their parent.
    pub(crate) fn duplicate(original: &Self, id: NodeId) -> Self {
        Self {
            hash: original.hash.clone(),
            left: original.left,
            right: original.right,
            parent: None,
            duplicate_of: Some(id),
        }
    }

    /// The node's digest
    #[inline]
    pub const fn hash(&self) -> &Bytes {
        &self.hash
    }

    /// Left child, for internal nodes
    #[inline]
    pub const fn left(&self) -> Option<NodeId> {
        self.left
    }

    /// Right child, for internal nodes
    #[inline]
    pub const fn right(&self) -> Option<NodeId> {
        self.right
    }

    /// Parent, absent only for the root
    #[inline]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The node this one was copied from to even out its level
    #[inline]
    pub const fn duplicate_of(&self) -> Option<NodeId> {
        self.duplicate_of
    }

    /// Whether the node has no children
    #[inline]
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Whether the node is a padding duplicate
    #[inline]
    pub const fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }
}

/// An immutable Merkle tree over an ordered sequence of data blocks.
///
/// Built by [`generate_merkle_tree`] or a [`TreeBuilder`]; a value of this
/// type always holds a fully constructed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    nodes: Vec<Node>,
    root: NodeId,
    leaf_count: usize,
    leaf_width: usize,
    height: usize,
}

impl MerkleTree {
    /// Build a tree with the default settings and Keccak256.
    ///
    /// Same as [`generate_merkle_tree`].
    pub fn generate<D: AsRef<[u8]>>(data: &[D]) -> Result<Self> {
        generate_merkle_tree(data)
    }

    pub(crate) const fn from_parts(
        nodes: Vec<Node>,
        root: NodeId,
        leaf_count: usize,
        leaf_width: usize,
        height: usize,
    ) -> Self {
        Self {
            nodes,
            root,
            leaf_count,
            leaf_width,
            height,
        }
    }

    /// The root node
    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[self.root.0]
    }

    /// Handle of the root node
    #[inline]
    pub const fn root_id(&self) -> NodeId {
        self.root
    }

    /// The root digest, committing to the whole input sequence
    #[inline]
    pub fn root_hash(&self) -> &Bytes {
        self.root().hash()
    }

    /// Look up a node by handle
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Parent of `node`, or `None` for the root
    pub fn parent(&self, node: &Node) -> Option<&Node> {
        node.parent.and_then(|id| self.node(id))
    }

    /// Left child of `node`
    pub fn left(&self, node: &Node) -> Option<&Node> {
        node.left.and_then(|id| self.node(id))
    }

    /// Right child of `node`
    pub fn right(&self, node: &Node) -> Option<&Node> {
        node.right.and_then(|id| self.node(id))
    }

    /// Number of reduction levels between the leaves and the root
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of input elements the tree was built from
    #[inline]
    pub const fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Total number of nodes, padding duplicates included
    #[inline]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The leaf level, left to right, including padding duplicates
    pub fn leaves(&self) -> slice::Iter<'_, Node> {
        self.nodes[..self.leaf_width].iter()
    }

    /// Every node, bottom-up in creation order
    pub fn iter(&self) -> slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Walk from the leaf at `index` up to the root.
    ///
    /// Returns `None` if `index` is outside the leaf level.
    pub fn path_to_root(&self, index: usize) -> Option<impl Iterator<Item = &Node> + '_> {
        let start = self.leaves().nth(index)?;
        Some(std::iter::successors(Some(start), move |node| self.parent(node)))
    }
}

impl<'a> IntoIterator for &'a MerkleTree {
    type Item = &'a Node;
    type IntoIter = slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
