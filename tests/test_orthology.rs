mod common;

use common::{find, names, plain_tree, topology, tree};
use gsdi::SdiError;
use gsdi::model::{Event, Tree};
use gsdi::sdi::{Gsdi, GsdiOptions, SdiSe};

/// Gene tree with one duplication below the root:
/// (((A_1,B_1)x,(A_2,B_2)y)dup,C_1)root on species ((A,B),C).
fn reconciled() -> Tree {
    let species = tree("((A,B),C);");
    let mut gene = tree("(((A_1,B_1)x,(A_2,B_2)y)dup,C_1)root;");
    SdiSe::infer(&mut gene, &species).unwrap();
    gene
}

#[test]
fn test_event_at_lca() {
    let gene = reconciled();
    let (a1, a2, b1) = (find(&gene, "A_1"), find(&gene, "A_2"), find(&gene, "B_1"));
    assert_eq!(gene.event_at_lca(a1, a2).unwrap(), Event::Duplication);
    assert_eq!(gene.event_at_lca(a1, b1).unwrap(), Event::Speciation);
}

#[test]
fn test_are_orthologous() {
    let gene = reconciled();
    let (a1, a2, b1, c1) = (find(&gene, "A_1"), find(&gene, "A_2"), find(&gene, "B_1"), find(&gene, "C_1"));
    assert!(gene.are_orthologous(a1, b1).unwrap());
    assert!(gene.are_orthologous(a1, c1).unwrap());
    assert!(!gene.are_orthologous(a1, a2).unwrap());
    assert!(!gene.are_orthologous(b1, a2).unwrap());
}

#[test]
fn test_orthologs() {
    let gene = reconciled();
    let orthologs = gene.orthologs(find(&gene, "A_1")).unwrap();
    assert_eq!(names(&gene, &orthologs), vec!["B_1", "C_1"]);

    let orthologs = gene.orthologs(find(&gene, "C_1")).unwrap();
    assert_eq!(names(&gene, &orthologs), vec!["A_1", "A_2", "B_1", "B_2"]);
}

#[test]
fn test_super_orthologs() {
    let gene = reconciled();
    let super_orthologs = gene.super_orthologs(find(&gene, "A_1")).unwrap();
    assert_eq!(names(&gene, &super_orthologs), vec!["B_1"]);

    // Every path from C_1 passes the duplication
    assert!(gene.super_orthologs(find(&gene, "C_1")).unwrap().is_empty());
}

#[test]
fn test_ultra_paralogs() {
    let species = tree("(A,B);");
    let mut gene = tree("(((A_1,A_2)d1,A_3)d2,B_1)root;");
    SdiSe::infer(&mut gene, &species).unwrap();

    let paralogs = gene.ultra_paralogs(find(&gene, "A_1")).unwrap();
    assert_eq!(names(&gene, &paralogs), vec!["A_2", "A_3"]);
    let paralogs = gene.ultra_paralogs(find(&gene, "A_3")).unwrap();
    assert_eq!(names(&gene, &paralogs), vec!["A_1", "A_2"]);
    assert!(gene.ultra_paralogs(find(&gene, "B_1")).unwrap().is_empty());
}

#[test]
fn test_delete_non_orthologous_external_nodes() {
    let mut gene = reconciled();
    let deleted = gene.delete_non_orthologous_external_nodes(find(&gene, "A_1")).unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(topology(&gene), "((A_1,B_1)x,C_1)root");
    assert!(gene.is_valid());
}

#[test]
fn test_delete_possible_duplication_partners() {
    let species = tree("(A,B,C);");
    let mut gene = tree("((A_1,B_1)ab,C_1)root;");
    Gsdi::infer(&mut gene, &species, GsdiOptions::default()).unwrap();
    assert_eq!(gene.root().event(), Event::SpeciationOrDuplication);

    let deleted = gene.delete_non_orthologous_external_nodes(find(&gene, "A_1")).unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(topology(&gene), "(A_1,B_1)ab");
    assert!(gene.is_valid());
}

#[test]
fn test_queries_require_external_node() {
    let gene = reconciled();
    let dup = find(&gene, "dup");
    assert!(matches!(gene.orthologs(dup), Err(SdiError::InvalidArgument(_))));
    assert!(matches!(gene.super_orthologs(dup), Err(SdiError::InvalidArgument(_))));
    assert!(matches!(gene.ultra_paralogs(dup), Err(SdiError::InvalidArgument(_))));
}

#[test]
fn test_unreconciled_tree_is_all_orthologous() {
    let gene = plain_tree("((A,B),(C,D));");
    let a = find(&gene, "A");
    assert_eq!(gene.orthologs(a).unwrap().len(), 3);
    assert!(gene.ultra_paralogs(a).unwrap().is_empty());
}
