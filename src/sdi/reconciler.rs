//! Configuration and dispatch of reconciliation runs.

use crate::error::SdiError;
use crate::model::taxonomy::TaxonomyComparisonBase;
use crate::model::tree::Tree;
use crate::sdi::gsdi::{Gsdi, GsdiOptions};
use crate::sdi::mapper::{determine_comparison_base, transfer_node_names_to_taxonomy};
use crate::sdi::sdise::SdiSe;
use crate::sdi::Sdi;
use log::debug;
use std::fmt;

/// Reconciliation algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Generalized SDI, tolerating species tree polytomies (default)
    #[default]
    Gsdi,
    /// SDIse, for binary species trees
    SdiSe,
}

// =#========================================================================#=
// RECONCILER BUILDER
// =#========================================================================#=
/// Builder for a [Reconciler].
///
/// # Configuration Options
///
/// * **Algorithm**: [`gsdi()`](Self::gsdi) (default) or [`sdise()`](Self::sdise)
///
/// * **GSDI only**:
///   - [`with_most_parsimonious_duplication_model()`](Self::with_most_parsimonious_duplication_model):
///     Resolve polytomy-ambiguous nodes as speciations
///   - [`with_stripping_of_gene_tree()`](Self::with_stripping_of_gene_tree):
///     Delete gene tree leaves without species instead of failing
///   - [`with_mapping_backward()`](Self::with_mapping_backward):
///     Record the gene leaves mapped to each species
///
/// * **Input preparation**:
///   - [`with_species_names_as_taxonomy()`](Self::with_species_names_as_taxonomy):
///     Species tree leaves only carry names (e.g. from plain Newick); move
///     them into the taxonomy field the gene tree is compared by
///
/// # Example
/// ```
/// use gsdi::sdi::ReconcilerBuilder;
///
/// let reconciler = ReconcilerBuilder::new()
///     .with_most_parsimonious_duplication_model()
///     .with_stripping_of_gene_tree()
///     .build()?;
///
/// // GSDI-only options are rejected for SDIse
/// assert!(ReconcilerBuilder::new().sdise().with_stripping_of_gene_tree().build().is_err());
/// # Ok::<(), gsdi::SdiError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReconcilerBuilder {
    algorithm: Algorithm,
    options: GsdiOptions,
    species_names_as_taxonomy: bool,
}

impl ReconcilerBuilder {
    /// Creates a builder for GSDI without stripping and without most
    /// parsimonious duplication model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use GSDI (default).
    pub fn gsdi(mut self) -> Self {
        self.algorithm = Algorithm::Gsdi;
        self
    }

    /// Use SDIse instead of GSDI; requires a binary species tree.
    pub fn sdise(mut self) -> Self {
        self.algorithm = Algorithm::SdiSe;
        self
    }

    /// Select the algorithm explicitly.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Classify nodes left ambiguous by species polytomies as speciations.
    pub fn with_most_parsimonious_duplication_model(mut self) -> Self {
        self.options.most_parsimonious = true;
        self
    }

    /// Strip gene tree leaves that cannot be mapped instead of failing.
    pub fn with_stripping_of_gene_tree(mut self) -> Self {
        self.options.allow_stripping = true;
        self
    }

    /// Keep track of the gene tree leaves mapped to each species tree leaf.
    pub fn with_mapping_backward(mut self) -> Self {
        self.options.compute_mapping_backward = true;
        self
    }

    /// Transfer species tree leaf names into the taxonomy field the gene
    /// tree is compared by before reconciling.
    pub fn with_species_names_as_taxonomy(mut self) -> Self {
        self.species_names_as_taxonomy = true;
        self
    }

    /// Validates the configuration and creates the [Reconciler].
    ///
    /// # Errors
    /// [SdiError::InvalidArgument] if a GSDI-only option is combined with SDIse.
    pub fn build(self) -> Result<Reconciler, SdiError> {
        if self.algorithm == Algorithm::SdiSe {
            if self.options.most_parsimonious {
                return Err(SdiError::InvalidArgument(
                    "can only use most parsimonious duplication mode with GSDI".to_string(),
                ));
            }
            if self.options.allow_stripping {
                return Err(SdiError::InvalidArgument(
                    "can only allow stripping of gene tree with GSDI".to_string(),
                ));
            }
        }
        Ok(Reconciler {
            algorithm: self.algorithm,
            options: self.options,
            species_names_as_taxonomy: self.species_names_as_taxonomy,
        })
    }
}


// =#========================================================================#=
// RECONCILER
// =#========================================================================#=
/// A configured reconciliation, reusable for many gene trees.
#[derive(Debug, Clone)]
pub struct Reconciler {
    algorithm: Algorithm,
    options: GsdiOptions,
    species_names_as_taxonomy: bool,
}

impl Reconciler {
    /// Returns a new [ReconcilerBuilder].
    pub fn builder() -> ReconcilerBuilder {
        ReconcilerBuilder::new()
    }

    /// Returns the algorithm used by [Reconciler::reconcile].
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the GSDI options (not used by SDIse).
    pub fn options(&self) -> GsdiOptions {
        self.options
    }

    /// Reconciles `gene_tree` with `species_tree` using the configured
    /// algorithm. The species tree is never modified.
    pub fn reconcile(&self, gene_tree: &mut Tree, species_tree: &Tree) -> Result<Reconciliation, SdiError> {
        let prepared;
        let species_tree = if self.species_names_as_taxonomy {
            let base = determine_comparison_base(gene_tree)?;
            let mut copy = species_tree.clone();
            let transferred = transfer_node_names_to_taxonomy(&mut copy, base, true)?;
            debug!("Transferred {} species tree node names to {}", transferred, base);
            prepared = copy;
            &prepared
        } else {
            species_tree
        };

        match self.algorithm {
            Algorithm::Gsdi => Ok(Reconciliation::Gsdi(Gsdi::infer(gene_tree, species_tree, self.options)?)),
            Algorithm::SdiSe => Ok(Reconciliation::SdiSe(SdiSe::infer(gene_tree, species_tree)?)),
        }
    }
}


// =#========================================================================#=
// RECONCILIATION
// =#========================================================================#=
/// Result of [Reconciler::reconcile].
#[derive(Debug, Clone)]
pub enum Reconciliation {
    SdiSe(SdiSe),
    Gsdi(Gsdi),
}

impl Reconciliation {
    /// Returns the GSDI result, if GSDI was run.
    pub fn as_gsdi(&self) -> Option<&Gsdi> {
        match self {
            Reconciliation::Gsdi(gsdi) => Some(gsdi),
            Reconciliation::SdiSe(_) => None,
        }
    }

    /// Returns the SDIse result, if SDIse was run.
    pub fn as_sdise(&self) -> Option<&SdiSe> {
        match self {
            Reconciliation::SdiSe(sdise) => Some(sdise),
            Reconciliation::Gsdi(_) => None,
        }
    }

    /// Returns the number of nodes left ambiguous by species polytomies
    /// (zero for SDIse).
    pub fn speciation_or_duplication_events_sum(&self) -> usize {
        self.as_gsdi().map_or(0, Gsdi::speciation_or_duplication_events_sum)
    }

    /// Returns the mapping cost L, available for SDIse only.
    pub fn mapping_cost_l(&self) -> Option<usize> {
        self.as_sdise().map(SdiSe::mapping_cost_l)
    }

    fn inner(&self) -> &dyn Sdi {
        match self {
            Reconciliation::SdiSe(sdise) => sdise,
            Reconciliation::Gsdi(gsdi) => gsdi,
        }
    }
}

impl Sdi for Reconciliation {
    fn duplications_sum(&self) -> usize {
        self.inner().duplications_sum()
    }

    fn speciations_sum(&self) -> usize {
        self.inner().speciations_sum()
    }

    fn species_tree(&self) -> &Tree {
        self.inner().species_tree()
    }

    fn comparison_base(&self) -> TaxonomyComparisonBase {
        self.inner().comparison_base()
    }
}

/// Summary report of a reconciliation.
impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mapping based on                         : {}", self.comparison_base())?;
        if let Reconciliation::Gsdi(gsdi) = self {
            let species = self.species_tree();
            writeln!(f, "Number of polytomies in species tree used: {}", species.count_polytomies())?;
            writeln!(f, "Number of external nodes in species tree : {}", species.num_external_nodes())?;
            writeln!(
                f,
                "Number of stripped gene tree nodes       : {}",
                gsdi.stripped_gene_tree_nodes().values().sum::<usize>()
            )?;
            writeln!(f, "Number of stripped species tree nodes    : {}", gsdi.stripped_species_tree_nodes().len())?;
        }
        writeln!(f, "Number of duplications                   : {}", self.duplications_sum())?;
        match self {
            Reconciliation::Gsdi(gsdi) => {
                if !gsdi.options().most_parsimonious {
                    writeln!(
                        f,
                        "Number of potential duplications         : {}",
                        gsdi.speciation_or_duplication_events_sum()
                    )?;
                }
                writeln!(f, "Number of speciations                    : {}", self.speciations_sum())
            }
            Reconciliation::SdiSe(sdise) => {
                writeln!(f, "Number of speciations                    : {}", self.speciations_sum())?;
                writeln!(f, "Mapping cost L                           : {}", sdise.mapping_cost_l())
            }
        }
    }
}
