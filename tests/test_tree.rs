mod common;

use common::{find, leaf_names, plain_tree, topology, tree};
use gsdi::model::{BranchLength, CopyMode, Event, Taxonomy, Tree};

#[test]
fn test_building_tree() {
    let mut tree = Tree::new();
    let root = tree.add_root("root");
    let i1 = tree.add_child(root, "", Some(1.5));
    let l1 = tree.add_child(i1, "Kea", Some(1.0));
    let l2 = tree.add_child(i1, "Kaka", Some(1.0));
    let l3 = tree.add_child(root, "Kakapo", Some(0.5));

    // Counts
    assert_eq!(tree.num_external_nodes(), 3);
    assert_eq!(tree.num_internal_nodes(), 2);
    assert_eq!(tree.num_nodes(), 5);

    // Root
    assert_eq!(tree.root().index(), root);
    assert!(tree.root().is_root());
    assert_eq!(tree.root().name(), "root");

    // External
    let kaka = &tree[l2];
    assert!(kaka.is_external());
    assert_eq!(kaka.index(), l2);
    assert_eq!(kaka.parent(), Some(i1));

    // Internal
    let internal = &tree[i1];
    assert!(internal.is_internal());
    assert_eq!(internal.children(), &[l1, l2]);
    assert_eq!(internal.branch_length(), Some(BranchLength::new(1.5)));

    assert_eq!(tree.external_nodes(), &[l1, l2, l3]);
    assert!(tree.is_valid());
    assert!(tree.is_completely_binary());
}

#[test]
#[should_panic]
fn test_get_root_panics_on_empty_tree() {
    let tree = Tree::new();
    tree.root(); // Should panic
}

#[test]
#[should_panic]
fn test_get_node_out_of_bounds() {
    let tree = tree("(A,B);");
    let _ = &tree[55];
}

#[test]
#[should_panic]
fn test_negative_branch_length_panics() {
    let mut tree = Tree::new();
    let root = tree.add_root("");
    tree.add_child(root, "Weka", Some(-0.1));
}

#[test]
#[should_panic]
fn test_second_root_panics() {
    let mut tree = Tree::new();
    tree.add_root("");
    tree.add_root("");
}

#[test]
fn test_empty_tree() {
    let tree = Tree::new();
    assert!(tree.is_empty());
    assert!(tree.is_valid());
    assert!(tree.is_rooted());
    assert_eq!(tree.root_index(), None);
    assert_eq!(tree.num_external_nodes(), 0);
    assert_eq!(tree.post_order_iter().count(), 0);
}

#[test]
fn test_tree_name() {
    let mut tree = Tree::new().with_name("ratites");
    assert_eq!(tree.name(), Some("ratites"));
    tree.set_name("palaeognaths");
    assert_eq!(tree.name(), Some("palaeognaths"));
    assert_eq!(Tree::new().name(), None);
}

#[test]
fn test_single_node_tree() {
    let tree = plain_tree("Takahe;");
    assert_eq!(tree.num_nodes(), 1);
    assert_eq!(tree.num_external_nodes(), 1);
    assert!(tree.root().is_external());
    assert!(tree.root().is_root());
}

#[test]
fn test_node_lookup() {
    let tree = plain_tree("((A,B),C);");
    let a = find(&tree, "A");
    assert!(tree.contains(a));
    assert!(tree.get(99).is_none());
    assert!(tree.node(99).is_err());
    assert_eq!(tree.node(a).unwrap().name(), "A");
    assert_eq!(tree.parent(a), tree[a].parent());
}

#[test]
fn test_node_label_falls_back_to_taxonomy_and_index() {
    let mut tree = Tree::new();
    let root = tree.add_root("");
    let named = tree.add_child(root, "Hihi", None);
    let annotated = tree.add_child(root, "", None);
    tree[annotated].set_taxonomy(Taxonomy::with_code("NOTCI"));

    assert_eq!(tree[named].label(), "Hihi");
    assert_eq!(tree[annotated].label(), "NOTCI");
    assert_eq!(tree[root].label(), format!("[{}]", root));
}

#[test]
fn test_polytomy_counts() {
    let tree = plain_tree("((A,B,C),(D,E),F,G);");
    assert!(!tree.is_completely_binary());
    assert_eq!(tree.count_polytomies(), 2);
    assert_eq!(tree.num_external_nodes(), 7);
}

#[test]
fn test_external_descendants() {
    let tree = plain_tree("((A,B)ab,(C,(D,E)de)cde)root;");
    let cde = find(&tree, "cde");
    assert_eq!(tree.num_external_descendants(cde), 3);
    assert_eq!(tree.num_external_descendants(find(&tree, "root")), 5);
    assert_eq!(tree.num_external_descendants(find(&tree, "A")), 1);

    let names: Vec<&str> = tree
        .external_descendants(cde)
        .into_iter()
        .map(|n| tree[n].name())
        .collect();
    assert_eq!(names, vec!["C", "D", "E"]);
}

#[test]
fn test_is_ancestor() {
    let tree = plain_tree("((A,B)ab,C)root;");
    let (a, ab, c) = (find(&tree, "A"), find(&tree, "ab"), find(&tree, "C"));
    assert!(tree.is_ancestor(ab, a));
    assert!(tree.is_ancestor(a, a));
    assert!(!tree.is_ancestor(ab, c));
    assert!(!tree.is_ancestor(a, ab));
}

#[test]
fn test_total_branch_length_ignores_unset() {
    let tree = plain_tree("((A:1,B:2):0.5,C)root;");
    assert!((tree.total_branch_length() - 3.5).abs() < 1e-12);
}

// ============= Traversal Tests =============

#[test]
fn test_post_order_visits_children_before_parents() {
    let tree = plain_tree("((A,B)ab,(C,D,E)cde)root;");
    let order: Vec<&str> = tree.post_order_iter().map(|n| n.name()).collect();
    assert_eq!(order, vec!["A", "B", "ab", "C", "D", "E", "cde", "root"]);
}

#[test]
fn test_pre_order_visits_parents_before_children() {
    let tree = plain_tree("((A,B)ab,(C,D,E)cde)root;");
    let order: Vec<&str> = tree.pre_order_iter().map(|n| n.name()).collect();
    assert_eq!(order, vec!["root", "ab", "A", "B", "cde", "C", "D", "E"]);

    let sub: Vec<&str> = tree
        .pre_order_iter_from(find(&tree, "cde"))
        .map(|n| n.name())
        .collect();
    assert_eq!(sub, vec!["cde", "C", "D", "E"]);
}

// ============= Copy Tests =============

#[test]
fn test_copy_subtree_full() {
    let mut source = tree("((A:1,B:2)ab:3,C:4)root;");
    let ab = find(&source, "ab");
    source[ab].set_event(Event::Duplication);

    let copy = source.copy_subtree(ab, CopyMode::Full).unwrap();
    assert!(copy.is_valid());
    assert_eq!(topology(&copy), "(A,B)ab");
    assert_eq!(copy.root().branch_length(), None);
    assert_eq!(copy.root().event(), Event::Duplication);
    let a = find(&copy, "A");
    assert_eq!(copy[a].branch_length_or_zero(), 1.0);
    assert_eq!(copy[a].taxonomy(), Some(&Taxonomy::with_scientific_name("A")));
}

#[test]
fn test_copy_subtree_topology_only() {
    let source = tree("((A:1,B:2)ab:3,C:4)root;");
    let copy = source.copy_subtree(source.root_index().unwrap(), CopyMode::Topology).unwrap();
    assert_eq!(copy.num_nodes(), 5);
    assert!(copy.nodes().all(|n| n.name().is_empty() && n.taxonomy().is_none()));
    assert!((copy.total_branch_length() - 10.0).abs() < 1e-12);
}

#[test]
fn test_copy_subtree_unknown_node() {
    let source = tree("(A,B);");
    assert!(source.copy_subtree(17, CopyMode::Full).is_err());
}

#[test]
fn test_clone_keeps_indices() {
    let source = plain_tree("((Ruru,Kea)x,Tui)root;");
    let copy = source.clone();
    assert_eq!(find(&copy, "Kea"), find(&source, "Kea"));
    assert_eq!(leaf_names(&copy), leaf_names(&source));
}

#[test]
fn test_display_lists_nodes() {
    let mut tree = tree("((A:0.1,B:0.2):0.3,C:0.4);");
    let root = tree.root_index().unwrap();
    tree[root].set_event(Event::Speciation);
    let printed = tree.to_string();
    assert!(printed.starts_with("Tree with 3 external nodes (5 nodes total):"));
    assert!(printed.contains("\"A\""));
    assert!(printed.contains("(branch: 0.400)"));
    assert!(printed.contains("(speciation)"));
}

// ============= Taxonomy Tests =============

#[test]
fn test_taxonomy_is_equal_on_any_shared_field() {
    let mut a = Taxonomy::with_scientific_name("Strigops habroptila");
    a.set_id(Some(2489341));
    let mut b = Taxonomy::with_code("STRHA");
    b.set_id(Some(2489341));

    assert!(a.is_equal(&b));
    assert_ne!(a, b);
    assert!(!a.is_equal(&Taxonomy::with_scientific_name("strigops habroptila")));
}

#[test]
fn test_taxonomy_empty_string_unsets() {
    let mut t = Taxonomy::with_code("APTHA");
    t.set_code("");
    assert!(t.is_empty());
    assert_eq!(t.to_string(), "");
}
