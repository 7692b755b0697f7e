//! Tree model used by all algorithms of this crate.
//!
//! | Type | Role |
//! |------|------|
//! | [Tree] | Arena of [Node]s with a root, cached topology data, iterators |
//! | [Node] | Ordered children, parent, optional [BranchLength], name, [Taxonomy], [Event] |
//! | [Taxonomy] | Scientific name, code and numeric id of a taxon |
//! | [TaxonomyComparisonBase] | Field by which gene and species leaves are matched |
//!
//! Nodes refer to each other only by [NodeIndex]. Indices of deleted nodes
//! are never reused, so indices held by callers stay meaningful across
//! tree surgery (a deleted index simply stops being [Tree::contains]).

/// Tree nodes, events and branch lengths
pub mod node;
/// Taxonomic annotations
pub mod taxonomy;
/// Arena tree structure and traversal
pub mod tree;

pub use node::{BranchLength, Event, Node};
pub use taxonomy::{Taxonomy, TaxonomyComparisonBase, TaxonomyKey};
pub use tree::{CopyMode, NodeIndex, PostOrderIter, PreOrderIter, Tree};
