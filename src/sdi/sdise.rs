//! SDIse: speciation/duplication inference for binary gene and species trees.

use crate::error::SdiError;
use crate::model::node::Event;
use crate::model::taxonomy::TaxonomyComparisonBase;
use crate::model::tree::{NodeIndex, Tree};
use crate::sdi::mapper::{SpeciesLookup, determine_comparison_base};
use crate::sdi::{Sdi, check_tree};
use log::{debug, info, trace};

/// Result of reconciling a binary gene tree with a binary species tree.
///
/// Each internal gene tree node `g` is mapped to `M(g)`, the LCA of the
/// mappings of its two children. `g` is a duplication if `M(g)` equals the
/// mapping of one of its children and a speciation otherwise.
///
/// # Example
/// ```
/// use gsdi::model::{Event, Taxonomy, Tree};
/// use gsdi::sdi::{Sdi, SdiSe};
///
/// fn leaf(tree: &mut Tree, parent: usize, species: &str) -> usize {
///     let leaf = tree.add_child(parent, "", None);
///     tree[leaf].set_taxonomy(Taxonomy::with_code(species));
///     leaf
/// }
///
/// // Species tree (HUMAN,MOUSE)
/// let mut species = Tree::new();
/// let root = species.add_root("");
/// leaf(&mut species, root, "HUMAN");
/// leaf(&mut species, root, "MOUSE");
///
/// // Gene tree ((HUMAN,HUMAN),MOUSE)
/// let mut gene = Tree::new();
/// let root = gene.add_root("");
/// let paralogs = gene.add_child(root, "", None);
/// leaf(&mut gene, paralogs, "HUMAN");
/// leaf(&mut gene, paralogs, "HUMAN");
/// leaf(&mut gene, root, "MOUSE");
///
/// let sdi = SdiSe::infer(&mut gene, &species).unwrap();
/// assert_eq!(sdi.duplications_sum(), 1);
/// assert_eq!(gene[paralogs].event(), Event::Duplication);
/// assert_eq!(gene[root].event(), Event::Speciation);
/// ```
#[derive(Debug, Clone)]
pub struct SdiSe {
    comparison_base: TaxonomyComparisonBase,
    species_tree: Tree,
    /// Species node of each gene node, indexed by gene [NodeIndex]
    mapping: Vec<Option<NodeIndex>>,
    /// Losses attributed to each gene node, indexed by gene [NodeIndex]
    losses: Vec<usize>,
    duplications_sum: usize,
    speciations_sum: usize,
    mapping_cost: usize,
}

impl SdiSe {
    /// Reconciles `gene_tree` with `species_tree`, writing an [Event] onto
    /// every internal gene tree node.
    ///
    /// The whole mapping is computed before the gene tree is touched, so on
    /// error the gene tree is unchanged.
    ///
    /// # Errors
    /// - [SdiError::PreconditionViolation] if a tree is empty, unrooted or
    ///   not completely binary
    /// - [SdiError::AmbiguousInput] if the gene tree taxonomy gives no
    ///   comparison base or species taxonomies are not unique
    /// - [SdiError::UnmappableLeaf] if a gene tree leaf has no species
    pub fn infer(gene_tree: &mut Tree, species_tree: &Tree) -> Result<Self, SdiError> {
        check_tree("gene", gene_tree, true)?;
        check_tree("species", species_tree, true)?;

        let comparison_base = determine_comparison_base(gene_tree)?;
        let lookup = SpeciesLookup::build(species_tree, comparison_base)?;
        debug!("SDIse: mapping by {} onto {} species", comparison_base, lookup.len());

        let mut mapping = vec![None; gene_tree.capacity()];
        for &leaf in gene_tree.external_nodes() {
            let species = lookup.map(&gene_tree[leaf]).ok_or_else(|| SdiError::UnmappableLeaf {
                node: leaf,
                label: gene_tree[leaf].label(),
            })?;
            mapping[leaf] = Some(species);
        }

        let species_tree = species_tree.clone();
        let depths = species_tree.depths();
        let mut losses = vec![0; gene_tree.capacity()];
        let mut events = Vec::with_capacity(gene_tree.num_internal_nodes());
        let mut mapping_cost = 0;

        for node in gene_tree.post_order_iter() {
            if node.is_external() {
                continue;
            }
            let g = node.index();
            let m1 = mapped(&mapping, node.children()[0])?;
            let m2 = mapped(&mapping, node.children()[1])?;
            let m = species_tree.mapping_lca(m1, m2);
            mapping[g] = Some(m);

            let (event, cost) = match (m1 == m, m2 == m) {
                (false, false) => (Event::Speciation, depths[m1] + depths[m2] - 2 * depths[m] - 2),
                (true, false) => (Event::Duplication, depths[m2] - depths[m] + 1),
                (false, true) => (Event::Duplication, depths[m1] - depths[m] + 1),
                (true, true) => (Event::Duplication, 1),
            };
            losses[g] = if event == Event::Duplication { cost - 1 } else { cost };
            mapping_cost += cost;
            trace!("SDIse: gene node {} maps to species node {}: {}", g, m, event);
            events.push((g, event));
        }

        let mut duplications_sum = 0;
        let mut speciations_sum = 0;
        for (g, event) in events {
            match event {
                Event::Duplication => duplications_sum += 1,
                _ => speciations_sum += 1,
            }
            gene_tree[g].set_event(event);
        }

        info!(
            "SDIse: {} duplications, {} speciations, mapping cost L = {}",
            duplications_sum, speciations_sum, mapping_cost
        );

        Ok(SdiSe {
            comparison_base,
            species_tree,
            mapping,
            losses,
            duplications_sum,
            speciations_sum,
            mapping_cost,
        })
    }

    /// Returns the mapping cost L: duplications plus gene losses implied by
    /// the mapping.
    ///
    /// Per internal gene node `g` with children `c1`, `c2` and species depths
    /// `d`: `d(c1) + d(c2) - 2d(g) - 2` if neither child maps to `M(g)`,
    /// `d(other) - d(g) + 1` if one does, and `1` if both do.
    pub fn mapping_cost_l(&self) -> usize {
        self.mapping_cost
    }

    /// Returns the number of gene losses, i.e. the mapping cost without the
    /// duplications.
    pub fn losses_sum(&self) -> usize {
        self.mapping_cost - self.duplications_sum
    }

    /// Returns the number of losses implied at the internal gene node `gene_node`.
    pub fn losses_at(&self, gene_node: NodeIndex) -> usize {
        self.losses.get(gene_node).copied().unwrap_or(0)
    }

    /// Returns the species tree node the gene tree node `gene_node` maps to.
    pub fn species_mapping(&self, gene_node: NodeIndex) -> Option<NodeIndex> {
        self.mapping.get(gene_node).copied().flatten()
    }
}

impl Sdi for SdiSe {
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

/// Mapping of an already visited gene node.
pub(crate) fn mapped(mapping: &[Option<NodeIndex>], gene_node: NodeIndex) -> Result<NodeIndex, SdiError> {
    mapping[gene_node].ok_or_else(|| {
        SdiError::LogicInvariant(format!("gene node {} visited before being mapped", gene_node))
    })
}
