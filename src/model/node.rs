//! Node module for phylogenetic tree representation.

use crate::model::taxonomy::Taxonomy;
use crate::model::tree::NodeIndex;
use std::fmt;
use std::ops::Deref;

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// Represents a node in a rooted, ordered, n-ary phylogenetic tree.
///
/// Nodes live in the arena of a [Tree](crate::model::Tree) and refer to each
/// other only by [NodeIndex]. The topology fields (`parent`, `children`) can
/// only be changed through the tree, so that its caches stay consistent;
/// the data fields (name, taxonomy, branch length, event) are freely mutable.
///
/// # Invariants
/// - `index` is the slot of this node in the arena
/// - `parent` is `None` exactly for the root
/// - `branch_length` is non-negative if set; `None` means unset, not zero
#[derive(PartialEq, Debug, Clone)]
pub struct Node {
    /// Index of this node in the tree arena
    index: NodeIndex,
    /// Index of the parent node, `None` for the root
    parent: Option<NodeIndex>,
    /// Ordered indices of the child nodes
    children: Vec<NodeIndex>,
    /// Distance to parent node (optional, non-negative if present)
    branch_length: Option<BranchLength>,
    /// Raw node label; may be empty
    name: String,
    /// Taxonomic annotation, if any
    taxonomy: Option<Taxonomy>,
    /// Inferred evolutionary event
    event: Event,
}

impl Node {
    /// Creates a new parentless node without children.
    ///
    /// # Arguments
    /// * `index` - The unique index of this node in the tree (arena)
    /// * `name` - Node label (possibly empty)
    /// * `branch_length` - Distance to the parent node
    pub(crate) fn new(index: NodeIndex, name: String, branch_length: Option<BranchLength>) -> Self {
        Node {
            index,
            parent: None,
            children: Vec::new(),
            branch_length,
            name,
            taxonomy: None,
            event: Event::Unclassified,
        }
    }

    /// Returns the index of this node.
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Returns the index of the parent, or `None` if this is the root.
    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    /// Returns the ordered child indices.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Returns the child at `position`, if any.
    pub fn child(&self, position: usize) -> Option<NodeIndex> {
        self.children.get(position).copied()
    }

    /// Returns the number of children.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if this node has no children.
    pub fn is_external(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this node has at least one child.
    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns `true` if this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the branch length to the parent, if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns the branch length as a number, with unset counting as zero.
    pub fn branch_length_or_zero(&self) -> f64 {
        self.branch_length.map_or(0.0, |bl| *bl)
    }

    /// Sets (or unsets) the branch length to the parent.
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn set_branch_length(&mut self, length: Option<f64>) {
        self.branch_length = length.map(BranchLength::new);
    }

    /// Returns the node name (possibly empty).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the node name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the taxonomy of this node, if any.
    pub fn taxonomy(&self) -> Option<&Taxonomy> {
        self.taxonomy.as_ref()
    }

    /// Returns a mutable reference to the taxonomy, creating an empty one if needed.
    pub fn taxonomy_mut(&mut self) -> &mut Taxonomy {
        self.taxonomy.get_or_insert_with(Taxonomy::default)
    }

    /// Sets the taxonomy of this node.
    pub fn set_taxonomy(&mut self, taxonomy: Taxonomy) {
        self.taxonomy = Some(taxonomy);
    }

    /// Removes the taxonomy of this node.
    pub fn clear_taxonomy(&mut self) {
        self.taxonomy = None;
    }

    /// Returns `true` if this node has a taxonomy with at least one field set.
    pub fn has_taxonomy(&self) -> bool {
        self.taxonomy.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Returns the event assigned to this node.
    pub fn event(&self) -> Event {
        self.event
    }

    /// Assigns an event to this node.
    pub fn set_event(&mut self, event: Event) {
        self.event = event;
    }

    /// Returns `true` if this node was classified as a duplication.
    pub fn is_duplication(&self) -> bool {
        self.event == Event::Duplication
    }

    /// Returns `true` if this node was classified as a speciation.
    pub fn is_speciation(&self) -> bool {
        self.event == Event::Speciation
    }

    /// Returns a label for reports: the name, else the taxonomy, else the index.
    pub fn label(&self) -> String {
        if !self.name.is_empty() {
            self.name.clone()
        } else if let Some(taxonomy) = self.taxonomy.as_ref().filter(|t| !t.is_empty()) {
            taxonomy.to_string()
        } else {
            format!("[{}]", self.index)
        }
    }

    // Topology, only to be changed through the tree.
    pub(crate) fn set_parent(&mut self, parent: Option<NodeIndex>) {
        self.parent = parent;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeIndex> {
        &mut self.children
    }

    pub(crate) fn set_index(&mut self, index: NodeIndex) {
        self.index = index;
    }

    pub(crate) fn set_branch_length_raw(&mut self, branch_length: Option<BranchLength>) {
        self.branch_length = branch_length;
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}


// =#========================================================================#=
// EVENT
// =#========================================================================#=
/// Evolutionary event inferred for a gene tree node by reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Event {
    /// Not (yet) classified, e.g. leaves or trees not reconciled
    #[default]
    Unclassified,
    /// Lineages split because the species split
    Speciation,
    /// Lineages split because the gene was duplicated
    Duplication,
    /// Polytomy in the species tree leaves both interpretations open
    SpeciationOrDuplication,
}

impl Event {
    /// Returns `true` if this event has been assigned by a reconciliation.
    pub fn is_classified(&self) -> bool {
        !matches!(self, Event::Unclassified)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Event::Unclassified => "unclassified",
            Event::Speciation => "speciation",
            Event::Duplication => "duplication",
            Event::SpeciationOrDuplication => "speciation or duplication",
        };
        f.write_str(s)
    }
}


// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Branch length in a phylogenetic tree, enforced non-negative.
///
/// Represents the evolutionary distance between a node and its parent.
/// The value is guaranteed to be non-negative and finite.
/// An absent length is modelled as `Option<BranchLength>::None`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Creates a new branch length.
    ///
    /// # Arguments
    /// * `length` - The branch length value (must be non-negative)
    ///
    /// # Panics
    /// Panics if `length` is negative or not finite.
    pub fn new(length: f64) -> Self {
        assert!(length >= 0.0, "Branch length must be non-negative, got {}", length);
        assert!(length.is_finite(), "Branch length must be finite, got {}", length);
        BranchLength(length)
    }

    /// Combines two lengths along a path when the node between them is removed.
    ///
    /// Unset lengths are neutral: unset + unset = unset, unset + x = x,
    /// x + unset = x, and x + y = x + y.
    pub fn combine(a: Option<BranchLength>, b: Option<BranchLength>) -> Option<BranchLength> {
        match (a, b) {
            (None, None) => None,
            (Some(x), None) | (None, Some(x)) => Some(x),
            (Some(x), Some(y)) => Some(BranchLength(x.0 + y.0)),
        }
    }

    /// Creates a branch length from a computed value, clamping tiny negative
    /// rounding residues to zero.
    pub(crate) fn clamped(length: f64) -> Self {
        BranchLength::new(length.max(0.0))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}

impl fmt::Display for BranchLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_unset_is_neutral() {
        let x = Some(BranchLength::new(0.5));
        let y = Some(BranchLength::new(1.25));
        assert_eq!(BranchLength::combine(None, None), None);
        assert_eq!(BranchLength::combine(x, None), x);
        assert_eq!(BranchLength::combine(None, y), y);
        assert_eq!(BranchLength::combine(x, y), Some(BranchLength::new(1.75)));
    }

    #[test]
    fn test_clamped_rounding_residue() {
        assert_eq!(*BranchLength::clamped(-1e-12), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_negative_branch_length_panics() {
        BranchLength::new(-0.1);
    }
}
