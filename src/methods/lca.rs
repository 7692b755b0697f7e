//! Lowest common ancestors.

use crate::error::SdiError;
use crate::model::tree::{NodeIndex, Tree};
use bitvec::prelude::*;

impl Tree {
    /// Returns the lowest common ancestor of `a` and `b`.
    ///
    /// Marks all ancestors of `a` (including `a`) and walks from `b` towards
    /// the root until a marked node is met. Runs in O(depth(a) + depth(b))
    /// besides clearing the marker set.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if either index is not a node of this
    /// tree, or if the two nodes do not share an ancestor.
    ///
    /// # Example
    /// ```
    /// use gsdi::model::Tree;
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.add_root("");
    /// let ab = tree.add_child(root, "", None);
    /// let a = tree.add_child(ab, "A", None);
    /// let b = tree.add_child(ab, "B", None);
    /// let c = tree.add_child(root, "C", None);
    ///
    /// assert_eq!(tree.lca(a, b).unwrap(), ab);
    /// assert_eq!(tree.lca(a, c).unwrap(), root);
    /// assert_eq!(tree.lca(a, a).unwrap(), a);
    /// ```
    pub fn lca(&self, a: NodeIndex, b: NodeIndex) -> Result<NodeIndex, SdiError> {
        self.node(a)?;
        self.node(b)?;

        let mut ancestors_of_a: BitVec<u8, Lsb0> = BitVec::repeat(false, self.capacity());
        let mut current = Some(a);
        while let Some(c) = current {
            ancestors_of_a.set(c, true);
            current = self[c].parent();
        }

        let mut current = Some(b);
        while let Some(c) = current {
            if ancestors_of_a[c] {
                return Ok(c);
            }
            current = self[c].parent();
        }

        Err(SdiError::InvalidArgument(format!(
            "nodes {} and {} have no common ancestor",
            a, b
        )))
    }

    /// Returns the lowest common ancestor of all `nodes`.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if `nodes` is empty or contains an unknown index.
    pub fn lca_of(&self, nodes: &[NodeIndex]) -> Result<NodeIndex, SdiError> {
        let (&first, rest) = nodes
            .split_first()
            .ok_or_else(|| SdiError::InvalidArgument("no nodes given".to_string()))?;
        self.node(first)?;
        rest.iter().try_fold(first, |acc, &n| self.lca(acc, n))
    }

    /// LCA through cached pre-order ranks, for use in reconciliation loops.
    ///
    /// While the two nodes differ, the one ranked later cannot be an ancestor
    /// of the other and is replaced by its parent. Both indices must be live.
    pub(crate) fn mapping_lca(&self, a: NodeIndex, b: NodeIndex) -> NodeIndex {
        let (mut a, mut b) = (a, b);
        while a != b {
            if self.preorder_rank(a) > self.preorder_rank(b) {
                match self[a].parent() {
                    Some(p) => a = p,
                    None => return a,
                }
            } else {
                match self[b].parent() {
                    Some(p) => b = p,
                    None => return b,
                }
            }
        }
        a
    }
}
