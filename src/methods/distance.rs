//! Path lengths, depths and the furthest pair of external nodes.
//!
//! Unset branch lengths contribute zero to every distance.

use crate::error::SdiError;
use crate::model::tree::{NodeIndex, Tree};

/// Two external nodes at maximal path length from each other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurthestPair {
    /// Sum of branch lengths on the path between `node_a` and `node_b`
    pub distance: f64,
    /// One end of the path
    pub node_a: NodeIndex,
    /// The other end of the path
    pub node_b: NodeIndex,
}

impl Tree {
    /// Returns the summed branch length from `node` up to `ancestor`.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if either index is unknown or `ancestor`
    /// is not an ancestor of `node`.
    pub fn distance_to_ancestor(&self, node: NodeIndex, ancestor: NodeIndex) -> Result<f64, SdiError> {
        self.node(ancestor)?;
        let mut distance = 0.0;
        let mut current = node;
        while current != ancestor {
            let n = self.node(current)?;
            distance += n.branch_length_or_zero();
            current = n.parent().ok_or_else(|| {
                SdiError::InvalidArgument(format!("node {} is not an ancestor of node {}", ancestor, node))
            })?;
        }
        Ok(distance)
    }

    /// Returns the path length between `a` and `b` through their LCA.
    pub fn distance(&self, a: NodeIndex, b: NodeIndex) -> Result<f64, SdiError> {
        let lca = self.lca(a, b)?;
        Ok(self.distance_to_ancestor(a, lca)? + self.distance_to_ancestor(b, lca)?)
    }

    /// Returns the path length from `node` to the root.
    pub fn distance_to_root(&self, node: NodeIndex) -> Result<f64, SdiError> {
        let mut distance = 0.0;
        let mut current = Some(node);
        while let Some(c) = current {
            let n = self.node(c)?;
            if n.parent().is_some() {
                distance += n.branch_length_or_zero();
            }
            current = n.parent();
        }
        Ok(distance)
    }

    /// Returns the number of edges between `node` and the root.
    pub fn depth(&self, node: NodeIndex) -> Result<usize, SdiError> {
        let mut depth = 0;
        let mut current = self.node(node)?;
        while let Some(parent) = current.parent() {
            depth += 1;
            current = &self[parent];
        }
        Ok(depth)
    }

    /// Returns the depth of every node, indexed by [NodeIndex]
    /// (zero for free slots).
    pub fn depths(&self) -> Vec<usize> {
        let mut depths = vec![0; self.capacity()];
        for node in self.pre_order_iter() {
            if let Some(parent) = node.parent() {
                depths[node.index()] = depths[parent] + 1;
            }
        }
        depths
    }

    /// Returns the largest number of edges between the root and an external node.
    pub fn max_depth(&self) -> usize {
        let depths = self.depths();
        self.external_nodes().iter().map(|&n| depths[n]).max().unwrap_or(0)
    }

    /// Returns the largest path length between the root and an external node.
    pub fn max_distance_to_root(&self) -> f64 {
        let mut distances = vec![0.0; self.capacity()];
        let mut max = 0.0_f64;
        for node in self.pre_order_iter() {
            if let Some(parent) = node.parent() {
                distances[node.index()] = distances[parent] + node.branch_length_or_zero();
            }
            if node.is_external() {
                max = max.max(distances[node.index()]);
            }
        }
        max
    }

    /// Returns the external descendant of `node` furthest away from it
    /// (the leftmost one on ties; `node` itself if it is external).
    pub fn furthest_descendant(&self, node: NodeIndex) -> Result<NodeIndex, SdiError> {
        self.node(node)?;
        let mut furthest = node;
        let mut max = -1.0;
        for leaf in self.external_descendants(node) {
            let d = self.distance_to_ancestor(leaf, node)?;
            if d > max {
                max = d;
                furthest = leaf;
            }
        }
        Ok(furthest)
    }

    /// Finds the two external nodes with the longest path between them.
    ///
    /// Scans all pairs `(external[i], external[j])` with `j < i`; the first
    /// pair reaching the maximum is kept.
    ///
    /// # Returns
    /// `None` if the tree has fewer than two external nodes.
    ///
    /// # Errors
    /// [SdiError::LogicInvariant] if a negative distance is computed.
    pub fn furthest_pair(&self) -> Result<Option<FurthestPair>, SdiError> {
        let external = self.external_nodes();
        if external.len() < 2 {
            return Ok(None);
        }

        let mut best: Option<FurthestPair> = None;
        for i in 1..external.len() {
            for j in 0..i {
                let distance = self.distance(external[i], external[j])?;
                if distance < 0.0 {
                    return Err(SdiError::LogicInvariant(format!(
                        "negative distance {} between nodes {} and {}",
                        distance, external[i], external[j]
                    )));
                }
                if best.is_none_or(|b| distance > b.distance) {
                    best = Some(FurthestPair { distance, node_a: external[i], node_b: external[j] });
                }
            }
        }
        Ok(best)
    }

    /// Returns the longest path length between two external nodes,
    /// or 0 if there are fewer than two.
    pub fn furthest_distance(&self) -> Result<f64, SdiError> {
        Ok(self.furthest_pair()?.map_or(0.0, |p| p.distance))
    }

    /// Returns `true` if all external nodes are equidistant from the root.
    pub fn is_ultrametric(&self) -> Result<bool, SdiError> {
        let mut distances = self.external_nodes().iter().map(|&n| self.distance_to_root(n));
        let Some(first) = distances.next().transpose()? else {
            return Ok(true);
        };
        for d in distances {
            if (d? - first).abs() > crate::model::tree::EPSILON {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

