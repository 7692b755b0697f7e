//! Mapping of gene tree leaves onto species tree leaves by taxonomy.
//!
//! The field to compare by is chosen once per gene tree, preferring
//! scientific names over codes over ids. Matching is exact: case-sensitive
//! for names and codes, numeric for ids.

use crate::error::SdiError;
use crate::model::node::Node;
use crate::model::taxonomy::{TaxonomyComparisonBase, TaxonomyKey};
use crate::model::tree::{NodeIndex, Tree};
use std::collections::HashMap;

/// Determines by which taxonomy field the leaves of `gene_tree` can be mapped.
///
/// Only leaves carrying a non-empty taxonomy are considered; the first field
/// (in the order scientific name, code, id) present on all of them wins.
///
/// # Errors
/// [SdiError::AmbiguousInput] if no leaf has a taxonomy, or if no single
/// field is present on all leaves that have one.
pub fn determine_comparison_base(gene_tree: &Tree) -> Result<TaxonomyComparisonBase, SdiError> {
    let taxonomies: Vec<_> = gene_tree
        .external_nodes()
        .iter()
        .filter_map(|&leaf| gene_tree[leaf].taxonomy().filter(|t| !t.is_empty()))
        .collect();

    if taxonomies.is_empty() {
        return Err(SdiError::AmbiguousInput(
            "gene tree has no taxonomic data on its external nodes".to_string(),
        ));
    }

    TaxonomyComparisonBase::PRIORITY
        .into_iter()
        .find(|base| taxonomies.iter().all(|t| base.is_present(t)))
        .ok_or_else(|| {
            SdiError::AmbiguousInput(
                "gene tree external nodes share no common taxonomy field (scientific name, code or id)"
                    .to_string(),
            )
        })
}

/// Moves node names into the taxonomy field selected by `base`.
///
/// Scientific names and codes take the name over and leave the node
/// unnamed; ids are parsed as unsigned integers and the name is kept.
/// Unnamed nodes are skipped.
///
/// # Arguments
/// * `tree` - Tree to modify, e.g. a species tree read from plain Newick
/// * `base` - Taxonomy field to fill
/// * `external_only` - Only transfer names of external nodes
///
/// # Returns
/// The number of nodes whose name was transferred.
///
/// # Errors
/// [SdiError::InvalidArgument] if `base` is [TaxonomyComparisonBase::Id] and a
/// name is not a number; no node is modified then.
pub fn transfer_node_names_to_taxonomy(
    tree: &mut Tree,
    base: TaxonomyComparisonBase,
    external_only: bool,
) -> Result<usize, SdiError> {
    let mut targets = Vec::new();
    for node in tree.pre_order_iter() {
        let name = node.name().trim();
        if name.is_empty() || (external_only && node.is_internal()) {
            continue;
        }
        let id = match base {
            TaxonomyComparisonBase::Id => Some(name.parse::<u64>().map_err(|_| {
                SdiError::InvalidArgument(format!("node name \"{}\" is not a numeric taxonomy id", name))
            })?),
            _ => None,
        };
        targets.push((node.index(), name.to_string(), id));
    }

    for (index, name, id) in &targets {
        let node = &mut tree[*index];
        match base {
            TaxonomyComparisonBase::ScientificName => {
                node.taxonomy_mut().set_scientific_name(name.as_str());
                node.set_name("");
            }
            TaxonomyComparisonBase::Code => {
                node.taxonomy_mut().set_code(name.as_str());
                node.set_name("");
            }
            TaxonomyComparisonBase::Id => node.taxonomy_mut().set_id(*id),
        }
    }
    Ok(targets.len())
}


// =#========================================================================#=
// SPECIES LOOKUP
// =#========================================================================#=
/// Index from taxonomy keys to the external nodes of a species tree.
#[derive(Debug, Clone)]
pub struct SpeciesLookup {
    base: TaxonomyComparisonBase,
    leaves: HashMap<TaxonomyKey, NodeIndex>,
}

impl SpeciesLookup {
    /// Indexes the external nodes of `species_tree` by the field `base`.
    ///
    /// External nodes lacking that field are not indexed.
    ///
    /// # Errors
    /// [SdiError::AmbiguousInput] if two external nodes share a key.
    pub fn build(species_tree: &Tree, base: TaxonomyComparisonBase) -> Result<Self, SdiError> {
        let mut leaves = HashMap::with_capacity(species_tree.num_external_nodes());
        for &leaf in species_tree.external_nodes() {
            let Some(key) = species_tree[leaf].taxonomy().and_then(|t| t.key(base)) else {
                continue;
            };
            if leaves.insert(key.clone(), leaf).is_some() {
                return Err(SdiError::AmbiguousInput(format!(
                    "taxonomy \"{}\" is not unique in species tree",
                    key
                )));
            }
        }
        Ok(SpeciesLookup { base, leaves })
    }

    /// Returns the species tree leaf matching the taxonomy of `gene_node`.
    pub fn map(&self, gene_node: &Node) -> Option<NodeIndex> {
        let key = gene_node.taxonomy()?.key(self.base)?;
        self.leaves.get(&key).copied()
    }

    /// Returns the field this lookup compares by.
    pub fn base(&self) -> TaxonomyComparisonBase {
        self.base
    }

    /// Returns the number of indexed species.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns `true` if no species are indexed.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }
}
