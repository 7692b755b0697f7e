//! GSDI: generalized speciation/duplication inference.
//!
//! Reconciles a binary gene tree with a species tree that may contain
//! polytomies. Gene tree leaves without species can optionally be stripped;
//! species never referenced by the gene tree are always pruned from the
//! working copy of the species tree.

use crate::error::SdiError;
use crate::methods::surgery::DeletionMode;
use crate::model::node::Event;
use crate::model::taxonomy::TaxonomyComparisonBase;
use crate::model::tree::{NodeIndex, Tree};
use crate::sdi::mapper::{SpeciesLookup, determine_comparison_base};
use crate::sdi::sdise::mapped;
use crate::sdi::{Sdi, check_tree};
use bitvec::prelude::*;
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Options of a GSDI run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GsdiOptions {
    /// Classify nodes that a species polytomy leaves ambiguous as speciations
    /// instead of [Event::SpeciationOrDuplication]
    pub most_parsimonious: bool,
    /// Delete gene tree leaves without species instead of failing
    pub allow_stripping: bool,
    /// Record which gene tree leaves map to each species tree leaf
    pub compute_mapping_backward: bool,
}

/// Result of a GSDI reconciliation.
#[derive(Debug, Clone)]
pub struct Gsdi {
    options: GsdiOptions,
    comparison_base: TaxonomyComparisonBase,
    /// Pruned working copy of the species tree (same indices as the input)
    species_tree: Tree,
    /// Species node of each gene node, indexed by gene [NodeIndex]
    mapping: Vec<Option<NodeIndex>>,
    duplications_sum: usize,
    speciations_sum: usize,
    speciation_or_duplication_events_sum: usize,
    stripped_gene_tree_nodes: BTreeMap<String, usize>,
    stripped_species_tree_nodes: BTreeMap<NodeIndex, String>,
    mapped_species_tree_nodes: BTreeSet<NodeIndex>,
    species_to_gene_leaves: BTreeMap<NodeIndex, Vec<NodeIndex>>,
}

impl Gsdi {
    /// Reconciles `gene_tree` with `species_tree`, writing an [Event] onto
    /// every internal gene tree node.
    ///
    /// `species_tree` is not modified; a pruned copy is kept in the result.
    /// All checks and the leaf mapping happen before the gene tree is
    /// modified, so on error it is unchanged.
    ///
    /// # Errors
    /// - [SdiError::PreconditionViolation] if a tree is empty or unrooted,
    ///   if the gene tree is not completely binary, or if no gene tree leaf
    ///   can be mapped
    /// - [SdiError::AmbiguousInput] if the gene tree taxonomy gives no
    ///   comparison base or species taxonomies are not unique
    /// - [SdiError::UnmappableLeaf] if a gene tree leaf has no species and
    ///   stripping is not allowed
    pub fn infer(gene_tree: &mut Tree, species_tree: &Tree, options: GsdiOptions) -> Result<Self, SdiError> {
        check_tree("gene", gene_tree, true)?;
        check_tree("species", species_tree, false)?;

        let comparison_base = determine_comparison_base(gene_tree)?;
        let mut species = species_tree.clone();
        let lookup = SpeciesLookup::build(&species, comparison_base)?;
        debug!("GSDI: mapping by {} onto {} species", comparison_base, lookup.len());

        // Phase 1: mapping, no modification yet
        let mut mapping = vec![None; gene_tree.capacity()];
        let mut unmappable = Vec::new();
        for &leaf in gene_tree.external_nodes() {
            match lookup.map(&gene_tree[leaf]) {
                Some(s) => mapping[leaf] = Some(s),
                None if options.allow_stripping => unmappable.push(leaf),
                None => {
                    return Err(SdiError::UnmappableLeaf { node: leaf, label: gene_tree[leaf].label() });
                }
            }
        }
        if unmappable.len() == gene_tree.num_external_nodes() {
            return Err(SdiError::PreconditionViolation(format!(
                "no gene tree external node can be mapped to the species tree by {}",
                comparison_base
            )));
        }

        // Phase 1b: stripping
        let mut stripped_gene_tree_nodes = BTreeMap::new();
        for leaf in unmappable {
            let label = gene_tree[leaf].label();
            warn!("GSDI: stripping gene tree external node {} (no species with that {})", label, comparison_base);
            *stripped_gene_tree_nodes.entry(label).or_insert(0) += 1;
            strip_gene_leaf(gene_tree, leaf)?;
        }

        let mut used: BitVec<u8, Lsb0> = BitVec::repeat(false, species.capacity());
        let mut species_to_gene_leaves: BTreeMap<NodeIndex, Vec<NodeIndex>> = BTreeMap::new();
        for &leaf in gene_tree.external_nodes() {
            let s = mapped(&mapping, leaf)?;
            used.set(s, true);
            if options.compute_mapping_backward {
                species_to_gene_leaves.entry(s).or_default().push(leaf);
            }
        }
        let mapped_species_tree_nodes: BTreeSet<NodeIndex> = used.iter_ones().collect();

        let unused: Vec<NodeIndex> = species
            .external_nodes()
            .iter()
            .copied()
            .filter(|&s| !used[s])
            .collect();
        let mut stripped_species_tree_nodes = BTreeMap::new();
        for s in unused {
            stripped_species_tree_nodes.insert(s, species[s].label());
            species.delete_subtree(s, DeletionMode::Collapse)?;
        }
        debug!(
            "GSDI: stripped {} gene tree and {} species tree external nodes",
            stripped_gene_tree_nodes.values().sum::<usize>(),
            stripped_species_tree_nodes.len()
        );

        // Phase 2: events
        let mut events = Vec::with_capacity(gene_tree.num_internal_nodes());
        for node in gene_tree.post_order_iter() {
            if node.is_external() {
                continue;
            }
            let g = node.index();
            let child_mappings = node
                .children()
                .iter()
                .map(|&c| mapped(&mapping, c))
                .collect::<Result<Vec<_>, _>>()?;
            let s = child_mappings[1..]
                .iter()
                .fold(child_mappings[0], |acc, &m| species.mapping_lca(acc, m));
            mapping[g] = Some(s);

            let event = determine_event(gene_tree, &species, &mapping, g, s, &child_mappings, options.most_parsimonious);
            trace!("GSDI: gene node {} maps to species node {}: {}", g, s, event);
            events.push((g, event));
        }

        let mut result = Gsdi {
            options,
            comparison_base,
            species_tree: species,
            mapping,
            duplications_sum: 0,
            speciations_sum: 0,
            speciation_or_duplication_events_sum: 0,
            stripped_gene_tree_nodes,
            stripped_species_tree_nodes,
            mapped_species_tree_nodes,
            species_to_gene_leaves,
        };
        for (g, event) in events {
            match event {
                Event::Duplication => result.duplications_sum += 1,
                Event::Speciation => result.speciations_sum += 1,
                Event::SpeciationOrDuplication => result.speciation_or_duplication_events_sum += 1,
                Event::Unclassified => {}
            }
            gene_tree[g].set_event(event);
        }

        info!(
            "GSDI: {} duplications, {} speciations, {} speciations or duplications",
            result.duplications_sum, result.speciations_sum, result.speciation_or_duplication_events_sum
        );
        Ok(result)
    }

    /// Returns the options this result was computed with.
    pub fn options(&self) -> GsdiOptions {
        self.options
    }

    /// Returns the number of nodes left ambiguous by species tree polytomies
    /// (always zero in most parsimonious mode).
    pub fn speciation_or_duplication_events_sum(&self) -> usize {
        self.speciation_or_duplication_events_sum
    }

    /// Returns the labels of stripped gene tree external nodes with their counts.
    pub fn stripped_gene_tree_nodes(&self) -> &BTreeMap<String, usize> {
        &self.stripped_gene_tree_nodes
    }

    /// Returns the species tree external nodes that no gene maps to, with
    /// their labels. Indices refer to the species tree passed to [Gsdi::infer].
    pub fn stripped_species_tree_nodes(&self) -> &BTreeMap<NodeIndex, String> {
        &self.stripped_species_tree_nodes
    }

    /// Returns the species tree external nodes at least one gene maps to.
    pub fn mapped_species_tree_nodes(&self) -> &BTreeSet<NodeIndex> {
        &self.mapped_species_tree_nodes
    }

    /// Returns, per species tree external node, the gene tree external nodes
    /// mapped to it. Empty unless
    /// [compute_mapping_backward](GsdiOptions::compute_mapping_backward) is set.
    pub fn species_to_gene_leaves(&self) -> &BTreeMap<NodeIndex, Vec<NodeIndex>> {
        &self.species_to_gene_leaves
    }

    /// Returns the species tree node the gene tree node `gene_node` maps to.
    pub fn species_mapping(&self, gene_node: NodeIndex) -> Option<NodeIndex> {
        self.mapping.get(gene_node).copied().flatten()
    }
}

impl Sdi for Gsdi {
    fn duplications_sum(&self) -> usize {
        self.duplications_sum
    }

    fn speciations_sum(&self) -> usize {
        self.speciations_sum
    }

    fn species_tree(&self) -> &Tree {
        &self.species_tree
    }

    fn comparison_base(&self) -> TaxonomyComparisonBase {
        self.comparison_base
    }
}

/// Deletes a gene tree leaf and splices out its parent if that is left with
/// a single child.
fn strip_gene_leaf(gene_tree: &mut Tree, leaf: NodeIndex) -> Result<(), SdiError> {
    let parent = gene_tree[leaf].parent();
    gene_tree.delete_subtree(leaf, DeletionMode::Detach)?;
    if let Some(parent) = parent {
        if gene_tree[parent].num_children() == 1 {
            if gene_tree[parent].is_root() {
                gene_tree.splice_unary(parent)?;
            } else {
                gene_tree.remove_node(parent)?;
            }
        }
    }
    Ok(())
}

/// Classifies gene node `g` mapped to species node `s`.
///
/// - `s` external: all children map to the same species, duplication
/// - no child maps to `s`: speciation
/// - some child maps to `s` and `s` is binary: duplication
/// - some child maps to `s` and `s` is a polytomy: the leaf mappings of each
///   child are routed to the children of `s`; a route shared by two gene
///   children is a duplication, otherwise the polytomy leaves it open
fn determine_event(
    gene_tree: &Tree,
    species_tree: &Tree,
    mapping: &[Option<NodeIndex>],
    g: NodeIndex,
    s: NodeIndex,
    child_mappings: &[NodeIndex],
    most_parsimonious: bool,
) -> Event {
    let s_node = &species_tree[s];
    if s_node.is_external() {
        return Event::Duplication;
    }
    if !child_mappings.contains(&s) {
        return Event::Speciation;
    }
    if s_node.num_children() == 2 {
        return Event::Duplication;
    }

    let mut seen = HashSet::new();
    for &child in gene_tree[g].children() {
        let routes: HashSet<NodeIndex> = gene_tree
            .external_descendants(child)
            .into_iter()
            .filter_map(|leaf| mapping[leaf])
            .filter_map(|m| route_below(species_tree, s, m))
            .collect();
        for route in routes {
            if !seen.insert(route) {
                return Event::Duplication;
            }
        }
    }

    if most_parsimonious {
        Event::Speciation
    } else {
        Event::SpeciationOrDuplication
    }
}

/// Returns the child of `ancestor` on the path from `ancestor` down to `node`.
fn route_below(species_tree: &Tree, ancestor: NodeIndex, node: NodeIndex) -> Option<NodeIndex> {
    let mut current = node;
    loop {
        let parent = species_tree[current].parent()?;
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
}
