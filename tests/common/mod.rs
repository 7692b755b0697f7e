//! Helpers shared by the integration tests.
//!
//! Trees are written in a small Newick subset: nested parentheses, node
//! names and optional `:length`, e.g. `((A_1:0.1,B:0.2)ab:0.3,C:0.4)root;`.
//! The taxonomy of an external node is taken from the part of its name
//! before the first `_`, so `A_1` and `A_2` are two genes of species `A`.

#![allow(dead_code)]

use gsdi::model::{NodeIndex, Taxonomy, TaxonomyComparisonBase, Tree};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// External nodes get scientific names.
pub fn tree(newick: &str) -> Tree {
    build(newick, Some(TaxonomyComparisonBase::ScientificName))
}

/// External nodes get taxonomy codes.
pub fn tree_with_codes(newick: &str) -> Tree {
    build(newick, Some(TaxonomyComparisonBase::Code))
}

/// External nodes get numeric ids; their species part must be a number.
pub fn tree_with_ids(newick: &str) -> Tree {
    build(newick, Some(TaxonomyComparisonBase::Id))
}

/// Names only, no taxonomy.
pub fn plain_tree(newick: &str) -> Tree {
    build(newick, None)
}

/// Returns the index of the node named `name`.
pub fn find(tree: &Tree, name: &str) -> NodeIndex {
    tree.nodes()
        .find(|n| n.name() == name)
        .map(|n| n.index())
        .unwrap_or_else(|| panic!("no node named {}", name))
}

/// Returns the names of the given nodes, sorted.
pub fn names(tree: &Tree, nodes: &[NodeIndex]) -> Vec<String> {
    let mut names: Vec<String> = nodes.iter().map(|&n| tree[n].name().to_string()).collect();
    names.sort();
    names
}

/// Returns the names of all external nodes, sorted.
pub fn leaf_names(tree: &Tree) -> Vec<String> {
    names(tree, tree.external_nodes())
}

/// Compact Newick-like rendering (names only) for structural comparisons.
pub fn topology(tree: &Tree) -> String {
    fn render(tree: &Tree, index: NodeIndex, out: &mut String) {
        let node = &tree[index];
        if node.is_internal() {
            out.push('(');
            for (i, &child) in node.children().iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                render(tree, child, out);
            }
            out.push(')');
        }
        out.push_str(node.name());
    }
    let mut out = String::new();
    if let Some(root) = tree.root_index() {
        render(tree, root, &mut out);
    }
    out
}

fn build(newick: &str, taxonomy: Option<TaxonomyComparisonBase>) -> Tree {
    let chars: Vec<char> = newick.trim().trim_end_matches(';').chars().collect();
    let mut tree = Tree::new();
    let mut pos = 0;
    parse_node(&mut tree, None, &chars, &mut pos, taxonomy);
    assert_eq!(pos, chars.len(), "trailing input in {}", newick);
    assert!(tree.is_valid());
    tree
}

fn parse_node(
    tree: &mut Tree,
    parent: Option<NodeIndex>,
    chars: &[char],
    pos: &mut usize,
    taxonomy: Option<TaxonomyComparisonBase>,
) -> NodeIndex {
    let index = match parent {
        None => tree.add_root(""),
        Some(p) => tree.add_child(p, "", None),
    };

    let internal = chars.get(*pos) == Some(&'(');
    if internal {
        *pos += 1;
        loop {
            parse_node(tree, Some(index), chars, pos, taxonomy);
            match chars.get(*pos) {
                Some(',') => *pos += 1,
                Some(')') => {
                    *pos += 1;
                    break;
                }
                other => panic!("unexpected {:?} at {}", other, pos),
            }
        }
    }

    let name = read_token(chars, pos, &[',', ')', ':']);
    if chars.get(*pos) == Some(&':') {
        *pos += 1;
        let length = read_token(chars, pos, &[',', ')']);
        tree[index].set_branch_length(Some(length.parse().expect("branch length")));
    }

    if !internal && !name.is_empty() {
        if let Some(base) = taxonomy {
            let species = name.split('_').next().unwrap_or(&name);
            let t = match base {
                TaxonomyComparisonBase::ScientificName => Taxonomy::with_scientific_name(species),
                TaxonomyComparisonBase::Code => Taxonomy::with_code(species),
                TaxonomyComparisonBase::Id => Taxonomy::with_id(species.parse().expect("numeric taxonomy id")),
            };
            tree[index].set_taxonomy(t);
        }
    }
    tree[index].set_name(name);
    index
}

fn read_token(chars: &[char], pos: &mut usize, stop: &[char]) -> String {
    let start = *pos;
    while *pos < chars.len() && !stop.contains(&chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect::<String>().trim().to_string()
}

/// Grows a binary tree by repeatedly splitting the external node picked by
/// each entry of `splits`. New nodes take their branch lengths from
/// `lengths` in turn (unset if `lengths` is empty). External nodes are
/// named `L0`, `L1`, ... left to right.
pub fn grown_binary_tree(splits: &[usize], lengths: &[f64]) -> Tree {
    let mut tree = Tree::new();
    let root = tree.add_root("");
    let mut leaves = vec![root];
    let mut next_length = lengths.iter().copied().cycle();
    for &pick in splits {
        let leaf = leaves.swap_remove(pick % leaves.len());
        for _ in 0..2 {
            leaves.push(tree.add_child(leaf, "", next_length.next()));
        }
    }
    for (i, leaf) in tree.external_nodes().to_vec().into_iter().enumerate() {
        tree[leaf].set_name(format!("L{}", i));
    }
    tree
}
