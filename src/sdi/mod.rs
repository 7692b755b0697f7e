//! Speciation/duplication inference (SDI) by gene tree/species tree reconciliation.
//!
//! | Algorithm | Gene tree | Species tree | Extras |
//! |-----------|-----------|--------------|--------|
//! | [SdiSe] | binary | binary | mapping cost L (duplications + losses) |
//! | [Gsdi] | binary | may contain polytomies | stripping of unmappable leaves, most parsimonious mode |
//!
//! Both write an [Event](crate::model::Event) onto each internal gene tree
//! node and report their counts through the [Sdi] trait. Use
//! [ReconcilerBuilder] to pick an algorithm and its options in one place.

pub mod gsdi;
pub mod mapper;
pub mod reconciler;
pub mod sdise;

pub use gsdi::{Gsdi, GsdiOptions};
pub use mapper::{SpeciesLookup, determine_comparison_base, transfer_node_names_to_taxonomy};
pub use reconciler::{Reconciler, ReconcilerBuilder, Reconciliation};
pub use sdise::SdiSe;

use crate::error::SdiError;
use crate::model::taxonomy::TaxonomyComparisonBase;
use crate::model::tree::Tree;

/// Results common to all reconciliation algorithms.
pub trait Sdi {
    /// Returns the number of gene tree nodes classified as duplications.
    fn duplications_sum(&self) -> usize;

    /// Returns the number of gene tree nodes classified as speciations.
    fn speciations_sum(&self) -> usize;

    /// Returns the species tree the gene tree was mapped onto.
    fn species_tree(&self) -> &Tree;

    /// Returns the taxonomy field gene and species leaves were matched by.
    fn comparison_base(&self) -> TaxonomyComparisonBase;
}

/// Checks that `tree` is non-empty and rooted and, if `binary`, completely binary.
pub(crate) fn check_tree(which: &str, tree: &Tree, binary: bool) -> Result<(), SdiError> {
    if tree.is_empty() {
        return Err(SdiError::empty_tree(which));
    }
    if !tree.is_rooted() {
        return Err(SdiError::not_rooted(which));
    }
    if binary && !tree.is_completely_binary() {
        return Err(SdiError::not_binary(which));
    }
    Ok(())
}
