//! Tree module for phylogenetic tree representation.
//!
//! This module provides the core data structure for representing rooted
//! phylogenetic trees:
//! - `Tree`: The main tree structure using the arena pattern.
//! - `NodeIndex` is used to index nodes.
//! - `CopyMode` selects what a subtree copy carries over.

use crate::error::SdiError;
use crate::model::node::{BranchLength, Node};
use bitvec::prelude::*;
use std::fmt;
use std::sync::OnceLock;

/// Float comparison tolerance
pub(crate) const EPSILON: f64 = 1e-7;

/// Index of a node in a tree (arena).
pub type NodeIndex = usize;

/// What [Tree::copy_subtree] carries over into the new tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Structure, branch lengths, names, taxonomy and events
    Full,
    /// Structure and branch lengths only
    Topology,
}

/// Lazily derived topology data; reset on every topology change.
#[derive(Debug, Clone, Default)]
struct TopologyCache {
    external_nodes: OnceLock<Vec<NodeIndex>>,
    preorder_ranks: OnceLock<Vec<usize>>,
    external_descendant_counts: OnceLock<Vec<usize>>,
}


// =#========================================================================#=
// TREE
// =#========================================================================#=
/// A rooted, ordered, n-ary phylogenetic tree represented using the arena
/// pattern on [Node].
///
/// Nodes are stored in a vector and referenced by [NodeIndex]. Deleting a
/// node frees its slot but never reuses it, so indices stay stable for the
/// lifetime of the tree and a clone of the tree uses the same indices.
///
/// # Structure
/// - Exactly one live node has no parent: the root
/// - Children are ordered; their order is the left-to-right order of the tree
/// - Branch lengths are optional, but if provided must be non-negative
/// - External node list, preorder ranks and external descendant counts are
///   cached and rebuilt lazily after any topology change
///
/// # Example
/// ```
/// use gsdi::model::{Taxonomy, Tree};
///
/// // ((A:0.2,B:0.2):0.2,C:0.4);
/// let mut tree = Tree::new();
/// let root = tree.add_root("");
/// let ab = tree.add_child(root, "", Some(0.2));
/// let a = tree.add_child(ab, "A", Some(0.2));
/// tree.add_child(ab, "B", Some(0.2));
/// tree.add_child(root, "C", Some(0.4));
/// tree[a].set_taxonomy(Taxonomy::with_scientific_name("Apteryx rowi"));
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.num_external_nodes(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Tree {
    /// Nodes of this tree (arena pattern); `None` marks a deleted node
    nodes: Vec<Option<Node>>,

    /// Index of the root of this tree
    root: Option<NodeIndex>,

    /// Whether the root is meaningful
    rooted: bool,

    /// Name of tree; optional
    name: Option<String>,

    cache: TopologyCache,
}

// ============================================================================
// New, Construction (pub)
// ============================================================================
impl Tree {
    /// Creates a new empty tree, marked as rooted.
    pub fn new() -> Self {
        Tree {
            nodes: Vec::new(),
            root: None,
            rooted: true,
            name: None,
            cache: TopologyCache::default(),
        }
    }

    /// Attaches a name to this tree.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds the root to an empty tree, returning its index.
    ///
    /// # Panics
    /// Panics if the tree already has a root.
    pub fn add_root(&mut self, name: impl Into<String>) -> NodeIndex {
        assert!(self.root.is_none(), "Tree already has a root");
        let index = self.push_node(name.into(), None);
        self.root = Some(index);
        self.topology_changed();
        index
    }

    /// Adds a new last child to `parent`, returning its index.
    ///
    /// # Arguments
    /// * `parent` - Index of a node of this tree
    /// * `name` - Name of the new node (may be empty)
    /// * `branch_length` - Length of incoming branch (non-negative), or `None`
    ///
    /// # Panics
    /// Panics if `parent` is not a node of this tree or `branch_length` is negative.
    pub fn add_child(&mut self, parent: NodeIndex, name: impl Into<String>, branch_length: Option<f64>) -> NodeIndex {
        assert!(self.contains(parent), "Cannot add child to missing node {}", parent);
        let index = self.push_node(name.into(), branch_length.map(BranchLength::new));
        self.attach(parent, index, None);
        self.topology_changed();
        index
    }

    fn push_node(&mut self, name: String, branch_length: Option<BranchLength>) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(Some(Node::new(index, name, branch_length)));
        index
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Getters / Accessors, etc. (pub)
// ============================================================================
impl Tree {
    /// Returns reference to name of this tree, or `None` if not set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Sets the name of this tree.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Returns whether this tree is considered rooted.
    pub fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// Marks this tree as rooted or unrooted; the topology is unchanged.
    pub fn set_rooted(&mut self, rooted: bool) {
        self.rooted = rooted;
    }

    /// Returns `true` if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the index of the root, or `None` for an empty tree.
    pub fn root_index(&self) -> Option<NodeIndex> {
        self.root
    }

    /// Returns a reference to the root node.
    ///
    /// # Panics
    /// Panics if the tree is empty.
    pub fn root(&self) -> &Node {
        match self.root {
            Some(root) => &self[root],
            None => panic!("Tree is empty and has no root"),
        }
    }

    /// Returns `true` if `index` refers to a live node of this tree.
    pub fn contains(&self, index: NodeIndex) -> bool {
        matches!(self.nodes.get(index), Some(Some(_)))
    }

    /// Returns the node at `index`, or `None` if there is none.
    pub fn get(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index).and_then(Option::as_ref)
    }

    /// Returns the node at `index` mutably, or `None` if there is none.
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index).and_then(Option::as_mut)
    }

    /// Returns the node at `index`, or an [SdiError::InvalidArgument].
    pub fn node(&self, index: NodeIndex) -> Result<&Node, SdiError> {
        self.get(index).ok_or_else(|| SdiError::unknown_node(index))
    }

    /// Returns the parent index of the node at `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a node of this tree.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self[index].parent()
    }

    /// Returns the number of live nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns the size of the arena, i.e. one more than the largest index ever used.
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Returns an iterator over all live nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(Option::as_ref)
    }

    /// Returns the external nodes in left-to-right order.
    pub fn external_nodes(&self) -> &[NodeIndex] {
        self.cache.external_nodes.get_or_init(|| {
            self.pre_order_iter()
                .filter(|n| n.is_external())
                .map(Node::index)
                .collect()
        })
    }

    /// Returns the number of external nodes.
    pub fn num_external_nodes(&self) -> usize {
        self.external_nodes().len()
    }

    /// Returns the number of internal nodes.
    pub fn num_internal_nodes(&self) -> usize {
        self.nodes().filter(|n| n.is_internal()).count()
    }

    /// Returns the number of external nodes in the subtree rooted at `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a node of this tree.
    pub fn num_external_descendants(&self, index: NodeIndex) -> usize {
        assert!(self.contains(index), "Node {} is not part of this tree", index);
        let counts = self.cache.external_descendant_counts.get_or_init(|| {
            let mut counts = vec![0; self.nodes.len()];
            for node in self.post_order_iter() {
                counts[node.index()] = if node.is_external() {
                    1
                } else {
                    node.children().iter().map(|&c| counts[c]).sum()
                };
            }
            counts
        });
        counts[index]
    }

    /// Returns the external nodes of the subtree rooted at `index`, left to right.
    pub fn external_descendants(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.pre_order_iter_from(index)
            .filter(|n| n.is_external())
            .map(Node::index)
            .collect()
    }

    /// Returns all nodes of the subtree rooted at `index` in pre-order.
    pub fn subtree(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.pre_order_iter_from(index).map(Node::index).collect()
    }

    /// Returns `true` if every internal node has exactly two children.
    pub fn is_completely_binary(&self) -> bool {
        self.nodes().all(|n| n.is_external() || n.num_children() == 2)
    }

    /// Returns the number of internal nodes with more than two children.
    pub fn count_polytomies(&self) -> usize {
        self.nodes().filter(|n| n.num_children() > 2).count()
    }

    /// Returns `true` if `ancestor` lies on the path from `index` to the root
    /// (a node is its own ancestor).
    pub fn is_ancestor(&self, ancestor: NodeIndex, index: NodeIndex) -> bool {
        let mut current = Some(index);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).and_then(Node::parent);
        }
        false
    }

    /// Returns the sum of all set branch lengths in the tree.
    pub fn total_branch_length(&self) -> f64 {
        self.nodes()
            .filter_map(Node::branch_length)
            .map(|bl| *bl)
            .sum::<f64>()
    }

    /// Validates the tree structure and all index references.
    ///
    /// Checks:
    /// - Root is set (unless the tree is empty) and has no parent
    /// - All node indices match their position in the arena
    /// - Only the root lacks a parent
    /// - All child indices are live and point back to the correct parent
    /// - Every parent lists its child exactly once
    /// - All nodes are reachable from the root without cycles
    ///
    /// # Returns
    /// `true` if tree is valid, `false` otherwise
    pub fn is_valid(&self) -> bool {
        let Some(root) = self.root else {
            return self.nodes.iter().all(Option::is_none);
        };
        if !self.contains(root) || self[root].parent().is_some() {
            return false;
        }

        let mut num_live = 0;
        for (index, slot) in self.nodes.iter().enumerate() {
            let Some(node) = slot else { continue };
            num_live += 1;

            if node.index() != index {
                return false;
            }

            for &child in node.children() {
                if !self.contains(child) || self[child].parent() != Some(index) {
                    return false;
                }
            }

            match node.parent() {
                None => {
                    if index != root {
                        return false;
                    }
                }
                Some(parent) => {
                    if !self.contains(parent) {
                        return false;
                    }
                    let occurrences = self[parent].children().iter().filter(|&&c| c == index).count();
                    if occurrences != 1 {
                        return false;
                    }
                }
            }
        }

        // Reachability and acyclicity
        let mut visited: BitVec<u8, Lsb0> = BitVec::repeat(false, self.nodes.len());
        let mut stack = vec![root];
        let mut num_reached = 0;
        while let Some(index) = stack.pop() {
            if visited[index] {
                return false;
            }
            visited.set(index, true);
            num_reached += 1;
            stack.extend(self[index].children().iter().copied());
        }

        num_reached == num_live
    }

    /// Returns an iterator over the tree in post-order (children before parents).
    ///
    /// Useful for aggregating data from leaves upward, e.g. species mappings.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root)
    }

    /// Returns an iterator over the subtree rooted at `index` in post-order.
    pub fn post_order_iter_from(&self, index: NodeIndex) -> PostOrderIter<'_> {
        PostOrderIter::new(self, Some(index).filter(|&i| self.contains(i)))
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root)
    }

    /// Returns an iterator over the subtree rooted at `index` in pre-order.
    pub fn pre_order_iter_from(&self, index: NodeIndex) -> PreOrderIter<'_> {
        PreOrderIter::new(self, Some(index).filter(|&i| self.contains(i)))
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, index: NodeIndex) -> &Self::Output {
        match self.nodes.get(index) {
            Some(Some(node)) => node,
            _ => panic!("Node {} is not part of this tree", index),
        }
    }
}

impl std::ops::IndexMut<NodeIndex> for Tree {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        match self.nodes.get_mut(index) {
            Some(Some(node)) => node,
            _ => panic!("Node {} is not part of this tree", index),
        }
    }
}

// ============================================================================
// Copying (pub)
// ============================================================================
impl Tree {
    /// Copies the subtree rooted at `from` into a new, compactly indexed tree.
    ///
    /// The copied root keeps no branch length. Node indices of the copy
    /// follow the pre-order of the subtree.
    ///
    /// # Errors
    /// Returns [SdiError::InvalidArgument] if `from` is not a node of this tree.
    pub fn copy_subtree(&self, from: NodeIndex, mode: CopyMode) -> Result<Tree, SdiError> {
        self.node(from)?;

        let mut copy = Tree::new();
        copy.rooted = self.rooted;
        copy.name = self.name.clone();

        // (source index, index of parent in copy)
        let mut stack: Vec<(NodeIndex, Option<NodeIndex>)> = vec![(from, None)];
        while let Some((source_index, copy_parent)) = stack.pop() {
            let source = &self[source_index];
            let index = copy.nodes.len();
            let mut node = match mode {
                CopyMode::Full => source.clone(),
                CopyMode::Topology => Node::new(index, String::new(), source.branch_length()),
            };
            node.set_index(index);
            node.children_mut().clear();
            node.set_parent(None);
            copy.nodes.push(Some(node));

            match copy_parent {
                Some(parent) => copy.attach(parent, index, None),
                None => {
                    copy[index].set_branch_length_raw(None);
                    copy.root = Some(index);
                }
            }

            for &child in source.children().iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        Ok(copy)
    }
}

// ============================================================================
// Topology primitives (crate)
// ============================================================================
impl Tree {
    /// Drops all cached topology data.
    pub(crate) fn topology_changed(&mut self) {
        self.cache = TopologyCache::default();
    }

    /// Returns the rank of `index` in a pre-order traversal of the whole tree.
    /// Ancestors always rank lower than their descendants.
    pub(crate) fn preorder_rank(&self, index: NodeIndex) -> usize {
        let ranks = self.cache.preorder_ranks.get_or_init(|| {
            let mut ranks = vec![usize::MAX; self.nodes.len()];
            for (rank, node) in self.pre_order_iter().enumerate() {
                ranks[node.index()] = rank;
            }
            ranks
        });
        ranks[index]
    }

    pub(crate) fn set_root(&mut self, root: Option<NodeIndex>) {
        if let Some(r) = root {
            self[r].set_parent(None);
        }
        self.root = root;
    }

    /// Makes `child` a child of `parent`, at `position` or appended.
    pub(crate) fn attach(&mut self, parent: NodeIndex, child: NodeIndex, position: Option<usize>) {
        let children = self[parent].children_mut();
        match position {
            Some(p) if p <= children.len() => children.insert(p, child),
            _ => children.push(child),
        }
        self[child].set_parent(Some(parent));
    }

    /// Unlinks `child` from its parent, returning the former parent and the
    /// position `child` had in its child list.
    pub(crate) fn detach(&mut self, child: NodeIndex) -> Option<(NodeIndex, usize)> {
        let parent = self[child].parent()?;
        let children = self[parent].children_mut();
        let position = children.iter().position(|&c| c == child)?;
        children.remove(position);
        self[child].set_parent(None);
        Some((parent, position))
    }

    /// Frees the slots of the subtree rooted at `index`; does not unlink it.
    pub(crate) fn free_subtree(&mut self, index: NodeIndex) {
        for i in self.subtree(index) {
            self.nodes[i] = None;
        }
    }

    /// Frees the slot of a single node; does not unlink it.
    pub(crate) fn free_node(&mut self, index: NodeIndex) {
        self.nodes[index] = None;
    }

    /// Allocates a fresh unlinked node.
    pub(crate) fn new_detached_node(&mut self) -> NodeIndex {
        self.push_node(String::new(), None)
    }
}

// ============================================================================
// Printing (pub)
// ============================================================================
/// Visual representation of the tree.
///
/// # Example Output
/// ```text
/// Tree with 3 external nodes (5 nodes total):
/// [4] (duplication)
///   ├─ [2] (branch: 0.300) (speciation)
///   │   ├─ [0] "A" Apteryx rowi (branch: 0.100)
///   │   └─ [1] "B" (branch: 0.200)
///   └─ [3] "C" (branch: 0.400)
/// ```
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tree with {} external nodes ({} nodes total):",
            self.num_external_nodes(), self.num_nodes())?;

        match self.root {
            Some(root) => self.fmt_node(f, root, "", true),
            None => writeln!(f, "(empty)"),
        }
    }
}

impl Tree {
    fn fmt_node(&self, f: &mut fmt::Formatter<'_>, index: NodeIndex, prefix: &str, is_last: bool) -> fmt::Result {
        let node = &self[index];
        let connector = if prefix.is_empty() { "" } else if is_last { "└─ " } else { "├─ " };

        write!(f, "{}{}[{}]", prefix, connector, index)?;
        if !node.name().is_empty() {
            write!(f, " \"{}\"", node.name())?;
        }
        if let Some(taxonomy) = node.taxonomy().filter(|t| !t.is_empty()) {
            write!(f, " {}", taxonomy)?;
        }
        if let Some(bl) = node.branch_length() {
            write!(f, " (branch: {:.3})", *bl)?;
        }
        if node.event().is_classified() {
            write!(f, " ({})", node.event())?;
        }
        writeln!(f)?;

        let new_prefix = if prefix.is_empty() {
            "  ".to_string()
        } else {
            format!("{}{}  ", prefix, if is_last { " " } else { "│" })
        };
        let num_children = node.num_children();
        for (i, &child) in node.children().iter().enumerate() {
            self.fmt_node(f, child, &new_prefix, i + 1 == num_children)?;
        }
        Ok(())
    }
}


// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Iterator for post-order traversal (children before parents).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each node is visited after all its descendants have been visited.
pub struct PostOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<(NodeIndex, bool)>, // (index, children_visited)
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a Tree, start: Option<NodeIndex>) -> Self {
        PostOrderIter { tree, stack: start.map(|s| (s, false)).into_iter().collect() }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let node = &self.tree[index];

            if children_visited || node.is_external() {
                return Some(node);
            }

            self.stack.push((index, true));
            // Push children right to left, so leftmost is processed first
            for &child in node.children().iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
///
/// This iterator uses a stack-based approach to traverse the tree without recursion.
/// Each node is visited before any of its descendants.
pub struct PreOrderIter<'a> {
    tree: &'a Tree,
    stack: Vec<NodeIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a Tree, start: Option<NodeIndex>) -> Self {
        PreOrderIter { tree, stack: start.into_iter().collect() }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree[index];
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}
