//! Taxonomy-driven queries and pruning of external nodes.

use crate::error::SdiError;
use crate::methods::surgery::DeletionMode;
use crate::model::taxonomy::Taxonomy;
use crate::model::tree::{NodeIndex, Tree};
use std::collections::{HashMap, HashSet};

impl Tree {
    /// Returns the distinct taxonomies of the external descendants of `node`,
    /// or `None` if one of them has no taxonomy.
    pub fn distinct_taxonomies(&self, node: NodeIndex) -> Result<Option<HashSet<Taxonomy>>, SdiError> {
        Ok(self
            .distinct_taxonomy_counts(node)?
            .map(|counts| counts.into_keys().collect()))
    }

    /// Returns how often each taxonomy occurs among the external descendants
    /// of `node`, or `None` if one of them has no taxonomy.
    pub fn distinct_taxonomy_counts(&self, node: NodeIndex) -> Result<Option<HashMap<Taxonomy, usize>>, SdiError> {
        self.node(node)?;
        let mut counts = HashMap::new();
        for leaf in self.external_descendants(node) {
            match self[leaf].taxonomy().filter(|t| !t.is_empty()) {
                Some(taxonomy) => *counts.entry(taxonomy.clone()).or_insert(0) += 1,
                None => return Ok(None),
            }
        }
        Ok(Some(counts))
    }

    /// Deletes every external node whose taxonomy is not in `keep`
    /// (structural equality), collapsing parents left with one child.
    ///
    /// # Returns
    /// The number of deleted external nodes.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if an external node has no taxonomy; the
    /// tree is then left untouched.
    pub fn retain_external_nodes_with_taxonomies(&mut self, keep: &HashSet<Taxonomy>) -> Result<usize, SdiError> {
        let mut to_delete = Vec::new();
        for &leaf in self.external_nodes() {
            let taxonomy = self[leaf]
                .taxonomy()
                .ok_or_else(|| missing_taxonomy(self, leaf))?;
            if !keep.contains(taxonomy) {
                to_delete.push(leaf);
            }
        }
        for &leaf in &to_delete {
            self.delete_subtree(leaf, DeletionMode::Collapse)?;
        }
        Ok(to_delete.len())
    }

    /// Deletes every external node whose taxonomy does not occur among the
    /// external nodes of `reference`, collapsing parents left with one child.
    ///
    /// Taxonomies are compared by their displayed value (scientific name,
    /// else code, else id).
    ///
    /// # Returns
    /// The number of deleted external nodes.
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if an external node of either tree has no
    /// taxonomy; this tree is then left untouched.
    pub fn delete_external_nodes_without_taxonomy_in(&mut self, reference: &Tree) -> Result<usize, SdiError> {
        let mut known = HashSet::new();
        for &leaf in reference.external_nodes() {
            let taxonomy = reference[leaf]
                .taxonomy()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| missing_taxonomy(reference, leaf))?;
            known.insert(taxonomy.to_string());
        }

        let mut to_delete = Vec::new();
        for &leaf in self.external_nodes() {
            let taxonomy = self[leaf]
                .taxonomy()
                .filter(|t| !t.is_empty())
                .ok_or_else(|| missing_taxonomy(self, leaf))?;
            if !known.contains(&taxonomy.to_string()) {
                to_delete.push(leaf);
            }
        }
        for &leaf in &to_delete {
            self.delete_subtree(leaf, DeletionMode::Collapse)?;
        }
        Ok(to_delete.len())
    }
}

fn missing_taxonomy(tree: &Tree, leaf: NodeIndex) -> SdiError {
    SdiError::InvalidArgument(format!("external node {} has no taxonomy", tree[leaf].label()))
}
