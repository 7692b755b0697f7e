//! Orthology and paralogy queries on a reconciled gene tree.
//!
//! Two genes are orthologous if their lowest common ancestor is not a
//! duplication. All queries read the [Event]s written by a reconciliation;
//! on an unreconciled tree every pair counts as orthologous.

use crate::error::SdiError;
use crate::methods::surgery::DeletionMode;
use crate::model::node::Event;
use crate::model::tree::{NodeIndex, Tree};

impl Tree {
    /// Returns the event at the lowest common ancestor of `a` and `b`.
    pub fn event_at_lca(&self, a: NodeIndex, b: NodeIndex) -> Result<Event, SdiError> {
        Ok(self[self.lca(a, b)?].event())
    }

    /// Returns `true` if the lowest common ancestor of `a` and `b` is not a duplication.
    pub fn are_orthologous(&self, a: NodeIndex, b: NodeIndex) -> Result<bool, SdiError> {
        Ok(self.event_at_lca(a, b)? != Event::Duplication)
    }

    /// Returns all other external nodes orthologous to the external node `node`.
    pub fn orthologs(&self, node: NodeIndex) -> Result<Vec<NodeIndex>, SdiError> {
        self.require_external(node)?;
        let mut orthologs = Vec::new();
        for &leaf in self.external_nodes() {
            if leaf != node && self.are_orthologous(node, leaf)? {
                orthologs.push(leaf);
            }
        }
        Ok(orthologs)
    }

    /// Returns the external nodes connected to the external node `node` by
    /// speciations only, i.e. without any duplication on the path between them.
    pub fn super_orthologs(&self, node: NodeIndex) -> Result<Vec<NodeIndex>, SdiError> {
        self.require_external(node)?;

        let mut deepest = node;
        while let Some(parent) = self[deepest].parent() {
            if self[parent].is_duplication() {
                break;
            }
            deepest = parent;
        }

        let mut super_orthologs = Vec::new();
        let mut stack = vec![deepest];
        while let Some(current) = stack.pop() {
            let n = &self[current];
            if n.is_external() {
                if current != node {
                    super_orthologs.push(current);
                }
            } else if !n.is_duplication() {
                stack.extend(n.children().iter().rev());
            }
        }
        Ok(super_orthologs)
    }

    /// Returns the other external nodes below the largest clade above the
    /// external node `node` in which every internal node is a duplication.
    pub fn ultra_paralogs(&self, node: NodeIndex) -> Result<Vec<NodeIndex>, SdiError> {
        self.require_external(node)?;

        let mut top = node;
        while let Some(parent) = self[top].parent() {
            if !self.is_duplication_clade(parent) {
                break;
            }
            top = parent;
        }

        Ok(self
            .external_descendants(top)
            .into_iter()
            .filter(|&leaf| leaf != node)
            .collect())
    }

    /// Deletes every external node whose lowest common ancestor with the
    /// external node `node` is a duplication or possibly one
    /// ([Event::SpeciationOrDuplication]), collapsing parents left with one child.
    ///
    /// # Returns
    /// The number of deleted external nodes.
    pub fn delete_non_orthologous_external_nodes(&mut self, node: NodeIndex) -> Result<usize, SdiError> {
        self.require_external(node)?;
        let mut to_delete = Vec::new();
        for &leaf in self.external_nodes() {
            if leaf == node {
                continue;
            }
            if matches!(self.event_at_lca(node, leaf)?, Event::Duplication | Event::SpeciationOrDuplication) {
                to_delete.push(leaf);
            }
        }
        for &leaf in &to_delete {
            self.delete_subtree(leaf, DeletionMode::Collapse)?;
        }
        Ok(to_delete.len())
    }

    // Every internal node in the subtree is a duplication.
    fn is_duplication_clade(&self, node: NodeIndex) -> bool {
        self.pre_order_iter_from(node)
            .filter(|n| n.is_internal())
            .all(|n| n.is_duplication())
    }

    fn require_external(&self, node: NodeIndex) -> Result<(), SdiError> {
        if self.node(node)?.is_external() {
            Ok(())
        } else {
            Err(SdiError::InvalidArgument(format!("node {} is not external", node)))
        }
    }
}
