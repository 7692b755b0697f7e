use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use gsdi::model::{NodeIndex, Taxonomy, Tree};
use gsdi::sdi::{Gsdi, GsdiOptions, SdiSe};
use std::hint::black_box;

/// Species counts (powers of two) of the regression trees.
const SPECIES_COUNTS: &[(&str, u32)] = &[("n256", 8), ("n4096", 12)];

/// Adds a balanced binary subtree with `2^depth` external nodes below
/// `parent`, naming external nodes by species `next`, `next + 1`, ...
fn add_balanced(tree: &mut Tree, parent: NodeIndex, depth: u32, next: &mut usize, copy: usize) {
    if depth == 0 {
        let leaf = tree.add_child(parent, format!("S{}_{}", next, copy), Some(0.5));
        tree[leaf].set_taxonomy(Taxonomy::with_scientific_name(format!("S{}", next)));
        *next += 1;
        return;
    }
    for _ in 0..2 {
        let child = tree.add_child(parent, "", Some(1.0));
        add_balanced(tree, child, depth - 1, next, copy);
    }
}

fn balanced_species_tree(depth: u32) -> Tree {
    let mut tree = Tree::new();
    let root = tree.add_root("");
    let mut next = 0;
    for _ in 0..2 {
        let child = tree.add_child(root, "", Some(1.0));
        add_balanced(&mut tree, child, depth - 1, &mut next, 0);
    }
    tree
}

/// Two paralogous copies of the species tree joined by a duplication.
fn duplicated_gene_tree(depth: u32) -> Tree {
    let mut tree = Tree::new();
    let root = tree.add_root("");
    for copy in 0..2 {
        let child = tree.add_child(root, "", Some(1.0));
        let mut next = 0;
        add_balanced(&mut tree, child, depth, &mut next, copy);
    }
    tree
}

/// Species tree with every other internal level removed, giving 4-way polytomies.
fn polytomous_species_tree(depth: u32) -> Tree {
    let mut tree = balanced_species_tree(depth);
    let depths = tree.depths();
    let odd: Vec<NodeIndex> = tree
        .nodes()
        .filter(|n| n.is_internal() && depths[n.index()] % 2 == 1)
        .map(|n| n.index())
        .collect();
    for node in odd {
        tree.remove_node(node).unwrap();
    }
    tree
}

fn reconciliation(c: &mut Criterion) {
    for &(name, depth) in SPECIES_COUNTS {
        let species = balanced_species_tree(depth);
        let polytomous = polytomous_species_tree(depth);
        let gene = duplicated_gene_tree(depth);

        c.bench_function(&format!("SDIse {}", name), |b| {
            b.iter_batched(
                || gene.clone(),
                |mut g| black_box(SdiSe::infer(&mut g, &species).unwrap()),
                BatchSize::LargeInput,
            );
        });
        c.bench_function(&format!("GSDI {}", name), |b| {
            b.iter_batched(
                || gene.clone(),
                |mut g| black_box(Gsdi::infer(&mut g, &species, GsdiOptions::default()).unwrap()),
                BatchSize::LargeInput,
            );
        });
        c.bench_function(&format!("GSDI polytomies {}", name), |b| {
            b.iter_batched(
                || gene.clone(),
                |mut g| black_box(Gsdi::infer(&mut g, &polytomous, GsdiOptions::default()).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
}

fn rooting(c: &mut Criterion) {
    let tree = balanced_species_tree(8);
    c.bench_function("midpoint root n256", |b| {
        b.iter_batched(
            || tree.clone(),
            |mut t| t.midpoint_root().unwrap(),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(regression, reconciliation);
criterion_group! {
    name = reporting;
    config = Criterion::default().sample_size(10);
    targets = rooting
}
criterion_main!(regression, reporting);
