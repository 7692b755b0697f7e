//! Error type shared by tree surgery and the reconciliation engines.
//!
//! All fallible operations of this crate return [SdiError]. Input problems
//! (ambiguous taxonomy, unmappable leaves, violated preconditions) are
//! reported before any tree is mutated.

use crate::model::tree::NodeIndex;
use thiserror::Error;

/// Errors that can occur while manipulating or reconciling trees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SdiError {
    /// An argument does not refer to a usable node or value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The taxonomic data does not determine a unique way of mapping
    #[error("Ambiguous input: {0}")]
    AmbiguousInput(String),

    /// A tree does not have the shape required by the algorithm
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// A gene tree leaf has no counterpart in the species tree
    #[error("Gene tree leaf {label} (node {node}) cannot be mapped to the species tree")]
    UnmappableLeaf {
        /// Index of the leaf in the gene tree
        node: NodeIndex,
        /// Display label of the leaf (name or taxonomy)
        label: String,
    },

    /// An internal consistency check failed
    #[error("Logic error: {0}")]
    LogicInvariant(String),
}

impl SdiError {
    /// Convenience constructor for an index that does not refer to a live node.
    pub fn unknown_node(index: NodeIndex) -> Self {
        SdiError::InvalidArgument(format!("node {} is not part of this tree", index))
    }

    /// Convenience constructor for a tree that is required to be fully binary.
    pub fn not_binary(which: &str) -> Self {
        SdiError::PreconditionViolation(format!("{} tree is not completely binary", which))
    }

    /// Convenience constructor for a tree that is required to be rooted.
    pub fn not_rooted(which: &str) -> Self {
        SdiError::PreconditionViolation(format!("{} tree is not rooted", which))
    }

    /// Convenience constructor for a tree that is required to be non-empty.
    pub fn empty_tree(which: &str) -> Self {
        SdiError::PreconditionViolation(format!("{} tree is empty", which))
    }

    /// Returns `true` for errors caused by the input trees (as opposed to
    /// broken internal consistency).
    pub fn is_input_error(&self) -> bool {
        !matches!(self, SdiError::LogicInvariant(_))
    }
}
