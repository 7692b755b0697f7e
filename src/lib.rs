//! Gsdi is a library to infer gene duplications and speciations by
//! reconciling gene trees with species trees.
//!
//! Given a rooted gene tree whose leaves carry taxonomic annotations and a
//! rooted species tree over those taxa, every internal gene tree node is
//! classified as a speciation or a duplication.
//! Core functionality provided:
//! - Reconciliation:
//!   - [GSDI](crate::sdi::Gsdi): binary gene tree, species tree may contain
//!     polytomies; optional stripping of gene leaves without species and a
//!     most parsimonious duplication model
//!   - [SDIse](crate::sdi::SdiSe): binary gene and species trees; also
//!     reports the mapping cost L (duplications plus losses)
//! - Tree model: arena [Tree] of [Node]s with names, branch lengths,
//!   [Taxonomy] and [Event] annotations. See [crate::model] for details.
//! - Tree methods: lowest common ancestors, distances, subtree deletion,
//!   node removal, rerooting, midpoint rooting, taxonomy based pruning and
//!   orthology queries on reconciled trees. See [crate::methods].
//!
//! Limitations:
//! - No file formats; trees are built with [Tree::add_root] and [Tree::add_child]
//! - Gene trees must be completely binary
//!
//! # Usage patterns
//! 1. Quick access with default settings: [infer_duplications] (GSDI) and
//!    [infer_duplications_binary] (SDIse).
//! 2. Configure a run with [ReconcilerBuilder](crate::sdi::ReconcilerBuilder)
//!    for stripping, most parsimonious mode, backward mapping, etc.
//!
//! ## Example
//! ```
//! use gsdi::model::{Event, Taxonomy, Tree};
//! use gsdi::sdi::{ReconcilerBuilder, Sdi};
//!
//! // Species tree (HUMAN,MOUSE,CHICK): a polytomy
//! let mut species = Tree::new();
//! let root = species.add_root("");
//! for code in ["HUMAN", "MOUSE", "CHICK"] {
//!     let leaf = species.add_child(root, "", None);
//!     species[leaf].set_taxonomy(Taxonomy::with_code(code));
//! }
//!
//! // Gene tree ((HUMAN,MOUSE),(HUMAN,YEAST))
//! let mut gene = Tree::new();
//! let root = gene.add_root("");
//! for pair in [["HUMAN", "MOUSE"], ["HUMAN", "YEAST"]] {
//!     let clade = gene.add_child(root, "", None);
//!     for code in pair {
//!         let leaf = gene.add_child(clade, "", None);
//!         gene[leaf].set_taxonomy(Taxonomy::with_code(code));
//!     }
//! }
//!
//! let reconciler = ReconcilerBuilder::new()
//!     .with_stripping_of_gene_tree()          // YEAST is not in the species tree
//!     .with_most_parsimonious_duplication_model()
//!     .build()?;
//! let result = reconciler.reconcile(&mut gene, &species)?;
//!
//! assert_eq!(result.duplications_sum(), 1);
//! assert_eq!(gene[gene.root_index().unwrap()].event(), Event::Duplication);
//! # Ok::<(), gsdi::SdiError>(())
//! ```

pub mod error;
pub mod methods;
pub mod model;
pub mod sdi;

pub use crate::error::SdiError;
pub use crate::model::{Event, Node, NodeIndex, Taxonomy, TaxonomyComparisonBase, Tree};

use crate::sdi::{Gsdi, GsdiOptions, SdiSe};

// ============================================================================
// Quick Reconciliation API
// ============================================================================
/// Reconciles `gene_tree` with `species_tree` using GSDI with default
/// options (no stripping, ambiguous nodes reported as
/// [Event::SpeciationOrDuplication]).
///
/// See [`Gsdi::infer`] for full documentation.
pub fn infer_duplications(gene_tree: &mut Tree, species_tree: &Tree) -> Result<Gsdi, SdiError> {
    Gsdi::infer(gene_tree, species_tree, GsdiOptions::default())
}

/// Reconciles two completely binary trees using SDIse.
///
/// See [`SdiSe::infer`] for full documentation.
pub fn infer_duplications_binary(gene_tree: &mut Tree, species_tree: &Tree) -> Result<SdiSe, SdiError> {
    SdiSe::infer(gene_tree, species_tree)
}
