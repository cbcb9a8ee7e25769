use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tree2tax::cluster::{ClusterEngine, ThresholdAndClusters, named_clusters, named_clusters_for_several_thresholds};
use tree2tax::model::{BranchLength, PhyloTree, VertexIndex};
use tree2tax::newick::parse_str;
use tree2tax::Tree2TaxError;

fn cluster_tip_names(result: &ThresholdAndClusters) -> Vec<Vec<&str>> {
    result
        .clusters()
        .iter()
        .map(|c| {
            let mut names = c.tip_names();
            names.sort();
            names
        })
        .collect()
}

fn cluster_names(result: &ThresholdAndClusters) -> Vec<String> {
    result.clusters().iter().map(|c| c.name()).collect()
}

// ============= Single Threshold =============
#[test]
fn test_simple() {
    let tree = parse_str("((A:0.11, B:0.12)C:0.1, D:0.2)root;").unwrap();
    let result = named_clusters(&tree, 0.25).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["A", "B"], vec!["D"]]);
    assert_eq!(cluster_names(&result), vec!["C", "Root"]);
}

#[test]
fn test_no_clustering() {
    let tree = parse_str("((A:0.11, B:0.12)C:0.1, D:0.2)root;").unwrap();
    let result = named_clusters(&tree, 0.05).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["A"], vec!["B"], vec!["D"]]);
    assert_eq!(cluster_names(&result), vec!["C.1", "C.2", "Root"]);
}

#[test]
fn test_cluster_everything() {
    let tree = parse_str("((A:0.11, B:0.12)C:0.1, D:0.2)root;").unwrap();
    let result = named_clusters(&tree, 0.5).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["A", "B", "D"]]);
    assert_eq!(cluster_names(&result), vec!["Root"]);
    assert_eq!(result.clusters()[0].cluster_number(), None);
}

#[test]
fn test_cluster_on_internal_node() {
    let tree = parse_str("((((A:11, B:12)C:10, D:9)E:20, F:20)G:30)root;").unwrap();
    let result = named_clusters(&tree, 40.0).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["A", "B", "D"], vec!["F"]]);
    assert_eq!(cluster_names(&result), vec!["E", "G"]);
}

#[test]
fn test_cluster_on_two_internal_nodes() {
    let tree = parse_str("((((A:11, B:12)C:10, (H:8, D:9)I:3)E:20, F:20)G:30)root;").unwrap();
    let result = named_clusters(&tree, 40.0).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["A", "B", "D", "H"], vec!["F"]]);
}

#[test]
fn test_cluster_into_three() {
    let tree = parse_str("((((A:11, B:12)C:10, (H:8, D:9)I:3)E:20, F:20)G:30)root;").unwrap();
    let result = named_clusters(&tree, 25.0).unwrap();
    assert_eq!(
        cluster_tip_names(&result),
        vec![vec!["A", "B"], vec!["D", "H"], vec!["F"]]
    );
    assert_eq!(cluster_names(&result), vec!["C", "I", "G"]);
}

#[test]
fn test_cluster_naming_on_two_internal_nodes() {
    let tree = parse_str("((((A:11, B:12):10, (H:8, D:9):3):20, F:20)G:30)root;").unwrap();
    let result = named_clusters(&tree, 40.0).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["A", "B", "D", "H"], vec!["F"]]);
    assert_eq!(cluster_names(&result), vec!["G.1", "G.2"]);
}

#[test]
fn test_cluster_naming_on_two_internal_nodes_reverse_order() {
    let tree = parse_str("((F:20, ((A:11, B:12):10, (H:8, D:9):3):20)G:30)root;").unwrap();
    let result = named_clusters(&tree, 40.0).unwrap();
    assert_eq!(cluster_tip_names(&result), vec![vec!["F"], vec!["A", "B", "D", "H"]]);
    assert_eq!(cluster_names(&result), vec!["G.2", "G.1"]);
}

#[test]
fn test_bootstrap_values_are_skipped_for_naming() {
    let tree = parse_str("((((A:1,B:1)0.99:5,C:1)'95:g__Halo':1,D:9)'f__Fam':1,E:20)root;").unwrap();
    let result = named_clusters(&tree, 2.0).unwrap();
    assert_eq!(
        cluster_tip_names(&result),
        vec![vec!["A", "B"], vec!["C"], vec!["D"], vec!["E"]]
    );
    assert_eq!(cluster_names(&result), vec!["g__Halo.1", "g__Halo.2", "f__Fam", "Root"]);
}

#[test]
fn test_condensed_names() {
    let tree = parse_str("(((A:1,B:1)'c__Halo; o__fu':1,C:1)'p__Eury':1,D:9)root;").unwrap();
    let result = named_clusters(&tree, 0.5).unwrap();
    let condensed: Vec<String> = result.clusters().iter().map(|c| c.condensed_name(None)).collect();
    assert_eq!(condensed, vec!["cHalo.ofu.1", "cHalo.ofu.2", "pEury", "Root"]);
    assert_eq!(result.clusters()[1].condensed_name(Some("gX")), "gX.2");
}

#[test]
fn test_numbering_by_tip_count_then_min_id() {
    // Three clusters below g__x: {A,B} first by size, then D before C by post-order id
    let tree = parse_str("((D:5,(C:5,(A:0.1,B:0.1):5):5)'g__x':1,E:1)root;").unwrap();
    let result = named_clusters(&tree, 1.0).unwrap();
    let by_name: Vec<(String, Vec<&str>)> = result
        .clusters()
        .iter()
        .map(|c| (c.name(), c.tip_names()))
        .collect();
    assert_eq!(
        by_name,
        vec![
            ("g__x.2".to_string(), vec!["D"]),
            ("g__x.3".to_string(), vec!["C"]),
            ("g__x.1".to_string(), vec!["A", "B"]),
            ("Root".to_string(), vec!["E"]),
        ]
    );
}

#[test]
fn test_multifurcation_keeps_tips_apart() {
    let tree = parse_str("((A:0.1,B:0.1,C:0.1)'g__x':1,D:1)root;").unwrap();
    let result = named_clusters(&tree, 5.0).unwrap();
    assert_eq!(result.clusters().len(), 4);
}

#[test]
fn test_invalid_threshold() {
    let tree = parse_str("(A:1,B:1)root;").unwrap();
    assert!(matches!(
        named_clusters(&tree, -0.1),
        Err(Tree2TaxError::InvalidThreshold(_))
    ));
    assert!(named_clusters_for_several_thresholds(&tree, &[0.1, f64::NAN]).is_err());
}

// ============= Tip Lookups =============
#[test]
fn test_tip_name_to_cluster() {
    let tree = parse_str("((A:0.11, B:0.12)C:0.1, D:0.2)root;").unwrap();
    let result = named_clusters(&tree, 0.25).unwrap();
    assert_eq!(result.tip_name_to_cluster("A").unwrap().name(), "C");
    assert_eq!(result.tip_name_to_cluster("B").unwrap().name(), "C");
    assert_eq!(result.tip_name_to_cluster("D").unwrap().name(), "Root");
    assert!(result.tip_name_to_cluster("Z").is_none());

    let d = tree.find_by_name("D").unwrap();
    assert_eq!(result.tip_to_cluster(d).unwrap().name(), "Root");
}

#[test]
fn test_duplicate_tip_names_last_wins() {
    let tree = parse_str("((A:0.1,A:0.1)'g__x':5,(A:0.1,B:0.1)'g__y':5)root;").unwrap();
    let result = named_clusters(&tree, 1.0).unwrap();
    assert_eq!(result.tip_name_to_cluster("A").unwrap().name(), "g__y");
    assert_eq!(result.tip_name_to_cluster("B").unwrap().name(), "g__y");
}

// ============= Several Thresholds =============
#[test]
fn test_several_thresholds_sorted_ascending() {
    let tree = parse_str("((A:0.11, B:0.12)C:0.1, D:0.2)root;").unwrap();
    let results = named_clusters_for_several_thresholds(&tree, &[0.5, 0.05, 0.25]).unwrap();
    let thresholds: Vec<f64> = results.iter().map(|r| r.threshold()).collect();
    assert_eq!(thresholds, vec![0.05, 0.25, 0.5]);
    assert_eq!(results[0].clusters().len(), 3);
    assert_eq!(cluster_names(&results[1]), vec!["C", "Root"]);
    assert_eq!(cluster_names(&results[2]), vec!["Root"]);
}

#[test]
fn test_absorbed_distance_compounds_across_thresholds() {
    // At 25, {A,B} absorbs 12; at 33, C:10 + I:3 + 12 + 9 = 34 still too far
    let tree = parse_str("((((A:11, B:12)C:10, (H:8, D:9)I:3)E:20, F:20)G:30)root;").unwrap();
    let results = named_clusters_for_several_thresholds(&tree, &[25.0, 33.0, 34.0]).unwrap();
    assert_eq!(results[0].clusters().len(), 3);
    assert_eq!(results[1].clusters().len(), 3);
    assert_eq!(
        cluster_tip_names(&results[2]),
        vec![vec!["A", "B", "D", "H"], vec!["F"]]
    );
}

#[test]
fn test_engine_rejects_decreasing_threshold() {
    let tree = parse_str("((A:0.11, B:0.12)C:0.1, D:0.2)root;").unwrap();
    let mut engine = ClusterEngine::new(&tree);
    engine.cluster_at(0.25).unwrap();
    assert!(matches!(
        engine.cluster_at(0.05),
        Err(Tree2TaxError::InvalidThreshold(_))
    ));
    // Same threshold again is fine and changes nothing
    assert_eq!(engine.cluster_at(0.25).unwrap().clusters().len(), 2);
    assert_eq!(engine.original().num_tips(), 3);
}

#[test]
fn test_taxonomy_node_points_to_label_source() {
    let tree = parse_str("(((A:1,B:1)'g__x':1,C:1)'f__y':1,D:9)root;").unwrap();
    let result = named_clusters(&tree, 0.5).unwrap();
    let genus = tree.find_by_name("g__x").unwrap();
    let family = tree.find_by_name("f__y").unwrap();
    let taxonomy_nodes: Vec<VertexIndex> = result.clusters().iter().map(|c| c.taxonomy_node()).collect();
    assert_eq!(taxonomy_nodes, vec![genus, genus, family, tree.root_index()]);
}

// ============= Properties On Random Trees =============
const NAME_POOL: &[Option<&str>] = &[None, None, Some("0.87"), Some("g__a"), Some("g__b"), Some("95:f__c; g__d")];

/// Random rooted tree with `num_tips` tips, mostly bifurcating, with some
/// multifurcations and some zero-length branches.
fn random_tree(seed: u64, num_tips: usize) -> PhyloTree {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut tree = PhyloTree::new();
    let mut pool: Vec<VertexIndex> = (0..num_tips)
        .map(|i| tree.add_vertex(Some(format!("T{}", i)), Some(random_length(&mut rng))))
        .collect();

    while pool.len() > 1 {
        let degree = if pool.len() >= 3 && rng.gen_bool(0.15) { 3 } else { 2 };
        let name = NAME_POOL[rng.gen_range(0..NAME_POOL.len())].map(str::to_string);
        let parent = tree.add_vertex(name, Some(random_length(&mut rng)));
        for _ in 0..degree {
            let child = pool.swap_remove(rng.gen_range(0..pool.len()));
            tree.add_child(parent, child);
        }
        pool.push(parent);
    }
    tree.set_root(pool[0]);
    tree
}

fn random_length(rng: &mut SmallRng) -> BranchLength {
    if rng.gen_bool(0.1) {
        BranchLength::new(0.0)
    } else {
        BranchLength::new(rng.gen_range(0.0..1.0))
    }
}

fn assert_partition(tree: &PhyloTree, result: &ThresholdAndClusters) {
    let mut seen = HashSet::new();
    for cluster in result.clusters() {
        assert!(!cluster.tips().is_empty());
        for tip in cluster.tips() {
            assert!(seen.insert(tip.index), "tip {} in two clusters", tip.index);
        }
    }
    let expected: HashSet<VertexIndex> = tree.tips().into_iter().collect();
    assert_eq!(seen, expected);
}

proptest! {
    #[test]
    fn proptest_every_tip_in_exactly_one_cluster(
        seed in 0u64..1000,
        num_tips in 1usize..60,
        threshold in 0.0f64..3.0,
    ) {
        let tree = random_tree(seed, num_tips);
        let result = named_clusters(&tree, threshold).unwrap();
        assert_partition(&tree, &result);
    }

    #[test]
    fn proptest_larger_thresholds_coarsen(
        seed in 0u64..1000,
        num_tips in 2usize..60,
        mut thresholds in proptest::collection::vec(0.0f64..3.0, 2..6),
    ) {
        let tree = random_tree(seed, num_tips);
        thresholds.sort_by(f64::total_cmp);
        let results = named_clusters_for_several_thresholds(&tree, &thresholds).unwrap();
        prop_assert_eq!(results.len(), thresholds.len());

        for pair in results.windows(2) {
            let (finer, coarser) = (&pair[0], &pair[1]);
            assert_partition(&tree, coarser);
            prop_assert!(coarser.clusters().len() <= finer.clusters().len());
            for cluster in finer.clusters() {
                let targets: HashSet<VertexIndex> = cluster
                    .tips()
                    .iter()
                    .map(|t| coarser.tip_to_cluster(t.index).unwrap().lca())
                    .collect();
                prop_assert_eq!(targets.len(), 1);
            }
        }
    }

    #[test]
    fn proptest_clustering_is_deterministic(
        seed in 0u64..1000,
        num_tips in 1usize..40,
        threshold in 0.0f64..2.0,
    ) {
        let tree = random_tree(seed, num_tips);
        let first = named_clusters(&tree, threshold).unwrap();
        let second = named_clusters(&tree, threshold).unwrap();
        prop_assert_eq!(first.clusters(), second.clusters());
    }

    #[test]
    fn proptest_cluster_numbers_are_consecutive(
        seed in 0u64..1000,
        num_tips in 1usize..60,
        threshold in 0.0f64..1.0,
    ) {
        let tree = random_tree(seed, num_tips);
        let result = named_clusters(&tree, threshold).unwrap();
        let names: Vec<String> = result.clusters().iter().map(|c| c.name()).collect();
        let unique: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());

        for cluster in result.clusters() {
            let same: Vec<_> = result
                .clusters()
                .iter()
                .filter(|c| c.taxonomy() == cluster.taxonomy())
                .collect();
            if same.len() == 1 {
                prop_assert_eq!(cluster.cluster_number(), None);
            } else {
                let number = cluster.cluster_number().unwrap();
                prop_assert!(number >= 1 && number <= same.len());
            }
        }
    }
}
