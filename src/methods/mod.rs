//! Algorithms on [Tree](crate::model::Tree), implemented as inherent methods.
//!
//! - [lca]: lowest common ancestors
//! - [distance]: path lengths, depths, furthest pair of external nodes
//! - [surgery]: subtree deletion, node removal, rerooting, midpoint rooting
//! - [taxa]: taxonomy-based queries and pruning
//! - [orthology]: orthologs, super-orthologs, ultra-paralogs of reconciled trees

pub mod distance;
pub mod lca;
pub mod orthology;
pub mod surgery;
pub mod taxa;

pub use distance::FurthestPair;
pub use surgery::DeletionMode;
