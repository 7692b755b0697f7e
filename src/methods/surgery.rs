//! Destructive tree operations: deletion, node removal and rerooting.
//!
//! Every operation here invalidates the cached topology data of the tree.

use crate::error::SdiError;
use crate::model::node::BranchLength;
use crate::model::tree::{EPSILON, NodeIndex, Tree};
use log::{debug, trace};

/// Largest accepted difference between the two root-to-leaf maxima after
/// midpoint rooting.
const MIDPOINT_TOLERANCE: f64 = 1e-6;

/// What happens to the parent of a deleted subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionMode {
    /// Only unlink; the parent may be left as a leaf or with one child
    Detach,
    /// A parent left with a single child is replaced by that child,
    /// combining the two branch lengths (a promoted root gets none)
    Collapse,
    /// Non-root ancestors left without children are deleted as well
    PruneEmpty,
}

// ============================================================================
// Deletion and removal (pub)
// ============================================================================
impl Tree {
    /// Deletes the subtree rooted at `node`.
    ///
    /// Deleting the root empties the tree. The indices of all deleted nodes
    /// stop being part of the tree and are never handed out again.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if `node` is not a node of this tree.
    pub fn delete_subtree(&mut self, node: NodeIndex, mode: DeletionMode) -> Result<(), SdiError> {
        self.node(node)?;

        let Some((parent, _)) = self.detach(node) else {
            self.free_subtree(node);
            self.set_root(None);
            self.topology_changed();
            return Ok(());
        };
        self.free_subtree(node);

        match mode {
            DeletionMode::Detach => {}
            DeletionMode::Collapse => {
                if self[parent].num_children() == 1 {
                    self.splice_unary(parent)?;
                }
            }
            DeletionMode::PruneEmpty => {
                let mut current = parent;
                while self[current].is_external() {
                    match self.detach(current) {
                        Some((p, _)) => {
                            self.free_node(current);
                            current = p;
                        }
                        None => break,
                    }
                }
            }
        }

        trace!("Deleted subtree at node {} ({:?})", node, mode);
        self.topology_changed();
        Ok(())
    }

    /// Removes a single non-root node.
    ///
    /// An external node is simply deleted. The children of an internal node
    /// take its place in its parent's child list, in order, and each child's
    /// branch length becomes the combination of its own and the removed
    /// node's (see [BranchLength::combine]).
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if `node` is unknown or the root.
    pub fn remove_node(&mut self, node: NodeIndex) -> Result<(), SdiError> {
        let n = self.node(node)?;
        if n.is_root() {
            return Err(SdiError::InvalidArgument(format!("cannot remove root node {}", node)));
        }
        if n.is_external() {
            return self.delete_subtree(node, DeletionMode::Detach);
        }

        let node_length = n.branch_length();
        let children = n.children().to_vec();
        let (parent, position) = self
            .detach(node)
            .ok_or_else(|| SdiError::LogicInvariant(format!("node {} lost its parent", node)))?;

        for (offset, &child) in children.iter().enumerate() {
            let combined = BranchLength::combine(self[child].branch_length(), node_length);
            self[child].set_branch_length_raw(combined);
            self.attach(parent, child, Some(position + offset));
        }
        self.free_node(node);

        self.topology_changed();
        Ok(())
    }

    /// Replaces a node with exactly one child by that child.
    ///
    /// For the root, the child becomes the new root and loses its branch length.
    pub(crate) fn splice_unary(&mut self, node: NodeIndex) -> Result<(), SdiError> {
        if self[node].num_children() != 1 {
            return Err(SdiError::LogicInvariant(format!("node {} is not unary", node)));
        }
        if self[node].is_root() {
            let child = self[node].children()[0];
            self.free_node(node);
            self[child].set_branch_length_raw(None);
            self.set_root(Some(child));
            self.topology_changed();
            Ok(())
        } else {
            self.remove_node(node)
        }
    }
}

// ============================================================================
// Rerooting (pub)
// ============================================================================
impl Tree {
    /// Roots the tree on the edge above `node`, at `distance_from_child` from `node`.
    ///
    /// The path from the former parent of `node` to the old root becomes one
    /// subtree of the new root with its edges reversed. An old root left with
    /// a single child is spliced out. If the parent of `node` already is a
    /// root with two children, only the lengths of its two edges are re-split.
    /// The sum of branch lengths stays the same.
    ///
    /// Nothing happens for trees with fewer than two external nodes or when
    /// `node` is the root. The tree is marked as rooted.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if `node` is unknown or `distance_from_child`
    /// is negative or exceeds the length of the edge.
    pub fn reroot(&mut self, node: NodeIndex, distance_from_child: f64) -> Result<(), SdiError> {
        let n = self.node(node)?;
        let (parent, length) = (n.parent(), n.branch_length());
        if !distance_from_child.is_finite() || distance_from_child < 0.0 {
            return Err(SdiError::InvalidArgument(format!(
                "invalid distance {} for rerooting", distance_from_child
            )));
        }
        let Some(parent) = parent else {
            self.set_rooted(true);
            return Ok(());
        };
        if self.num_external_nodes() < 2 {
            return Ok(());
        }
        self.set_rooted(true);

        // Parent is a binary root: move it along the path between its children
        if self[parent].is_root() && self[parent].num_children() == 2 {
            let sibling = self[parent]
                .children()
                .iter()
                .copied()
                .find(|&c| c != node)
                .ok_or_else(|| SdiError::LogicInvariant("binary root without sibling".to_string()))?;
            if let Some(total) = BranchLength::combine(length, self[sibling].branch_length()) {
                if distance_from_child > *total + EPSILON {
                    return Err(Self::split_too_long(distance_from_child, *total));
                }
                let lower = distance_from_child.min(*total);
                self[node].set_branch_length_raw(Some(BranchLength::clamped(lower)));
                self[sibling].set_branch_length_raw(Some(BranchLength::clamped(*total - lower)));
            }
            debug!("Rerooted on edge above node {} (root edges re-split)", node);
            return Ok(());
        }

        let (lower, upper) = match length {
            Some(len) if distance_from_child > *len + EPSILON => {
                return Err(Self::split_too_long(distance_from_child, *len));
            }
            Some(len) => {
                let lower = distance_from_child.min(*len);
                (Some(BranchLength::clamped(lower)), Some(BranchLength::clamped(*len - lower)))
            }
            None => (None, None),
        };

        // Path from the parent of `node` up to the old root
        let mut chain = vec![parent];
        while let Some(p) = self[chain[chain.len() - 1]].parent() {
            chain.push(p);
        }
        let chain_lengths: Vec<Option<BranchLength>> =
            chain.iter().map(|&v| self[v].branch_length()).collect();
        let old_root = chain[chain.len() - 1];

        self.detach(node);
        for &v in &chain[..chain.len() - 1] {
            self.detach(v);
        }
        for i in 0..chain.len() - 1 {
            self.attach(chain[i], chain[i + 1], None);
            self[chain[i + 1]].set_branch_length_raw(chain_lengths[i]);
        }

        let new_root = self.new_detached_node();
        self.attach(new_root, node, None);
        self[node].set_branch_length_raw(lower);
        self.attach(new_root, parent, None);
        self[parent].set_branch_length_raw(upper);
        self.set_root(Some(new_root));
        self.topology_changed();

        match self[old_root].num_children() {
            0 => self.delete_subtree(old_root, DeletionMode::Collapse)?,
            1 => self.remove_node(old_root)?,
            _ => {}
        }

        debug!("Rerooted on edge above node {} at distance {}", node, distance_from_child);
        Ok(())
    }

    fn split_too_long(distance: f64, length: f64) -> SdiError {
        SdiError::InvalidArgument(format!(
            "distance {} for rerooting exceeds edge length {}", distance, length
        ))
    }

    /// Roots the tree at the midpoint of the longest path between two external nodes.
    ///
    /// Does nothing for trees with fewer than two external nodes or without
    /// positive path lengths. Applying it twice gives the same rooting.
    ///
    /// # Errors
    /// [SdiError::LogicInvariant] if afterwards the two furthest external
    /// nodes are not equally far from the root.
    pub fn midpoint_root(&mut self) -> Result<(), SdiError> {
        let Some(pair) = self.furthest_pair()? else {
            return Ok(());
        };
        if pair.distance <= 0.0 {
            return Ok(());
        }

        let mut remaining = pair.distance / 2.0;
        let mut node = if self.distance_to_root(pair.node_a)? < self.distance_to_root(pair.node_b)? {
            pair.node_b
        } else {
            pair.node_a
        };
        while let Some(parent) = self[node].parent() {
            let length = self[node].branch_length_or_zero();
            if remaining <= length + MIDPOINT_TOLERANCE {
                remaining = remaining.min(length);
                break;
            }
            remaining -= length;
            node = parent;
        }
        if !self[node].is_root() {
            self.reroot(node, remaining)?;
        }

        let d1 = self.distance_to_root(pair.node_a)?;
        let d2 = self.distance_to_root(pair.node_b)?;
        if (d1 - d2).abs() > MIDPOINT_TOLERANCE {
            return Err(SdiError::LogicInvariant(format!(
                "midpoint rooting failed: root to furthest external nodes {} vs {}",
                d1, d2
            )));
        }
        Ok(())
    }
}
