use std::path::Path;
use tree2tax::Tree2TaxError;
use tree2tax::newick::{parse_file, parse_str};
use tree2tax::ranks::{DEFAULT_RANK_PREFIXES, DEFAULT_THRESHOLDS, RankedTaxonomyBuilder};

const NESTED: &str = "((((A:0.01,B:0.01)'g__c':0.01,C:1)'f__b':0.01,D:2)'o__a':0.01,E:3)root;";

#[test]
fn test_defaults() {
    assert_eq!(DEFAULT_RANK_PREFIXES.len(), DEFAULT_THRESHOLDS.len());
    assert!(DEFAULT_THRESHOLDS.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn test_fixture_taxonomy() {
    let path = Path::new("tests").join("fixtures").join("halobacteria.tree");
    let tree = parse_file(&path).unwrap();
    let taxonomy = RankedTaxonomyBuilder::new()
        .with_prefixes(&["o", "f", "g", "s"])
        .with_thresholds(&[1.0, 0.3, 0.1, 0.01])
        .build(&tree)
        .unwrap();

    assert_eq!(taxonomy.tips().len(), 8);
    assert_eq!(taxonomy.prefixes(), &["o", "f", "g", "s"]);
    assert_eq!(
        taxonomy.get("Hfx_volcanii").unwrap().taxonomy,
        "o__Root; f__fHaloferacaceae; g__gHaloferax; s__gHaloferax.1"
    );
    assert_eq!(
        taxonomy.get("Hfx_mediterranei").unwrap().taxonomy,
        "o__Root; f__fHaloferacaceae; g__gHaloferax; s__gHaloferax.2"
    );
    assert_eq!(
        taxonomy.get("Hah_hispanica").unwrap().labels,
        vec!["Root", "fHalobacteriaceae", "gHaloarcula", "gHaloarcula.2"]
    );
}

#[test]
fn test_coarse_first_thresholds() {
    let tree = parse_str(NESTED).unwrap();
    let coarse_first = RankedTaxonomyBuilder::new()
        .with_prefixes(&["k", "g"])
        .with_thresholds(&[10.0, 0.1])
        .build(&tree)
        .unwrap();
    assert_eq!(coarse_first.get("A").unwrap().taxonomy, "k__Root; g__gc");
    assert_eq!(coarse_first.get("C").unwrap().taxonomy, "k__Root; g__fb");
    assert_eq!(coarse_first.get("D").unwrap().taxonomy, "k__Root; g__oa");
    assert_eq!(coarse_first.get("E").unwrap().taxonomy, "k__Root; g__Root");
}

#[test]
fn test_fine_first_thresholds_rejected() {
    let tree = parse_str("((A:0.01,B:0.01)'g__Halo':0.5,C:0.5)root;").unwrap();
    for intermediate in [false, true] {
        let result = RankedTaxonomyBuilder::new()
            .with_prefixes(&["k", "g"])
            .with_thresholds(&[0.1, 1.5])
            .with_intermediate_taxonomy(intermediate)
            .build(&tree);
        assert!(matches!(result, Err(Tree2TaxError::InvalidThreshold(t)) if t == 1.5));
    }
}

#[test]
fn test_equal_thresholds_share_clusters() {
    let tree = parse_str("((A:0.01,B:0.01)'g__Halo':0.5,C:0.5)root;").unwrap();
    let taxonomy = RankedTaxonomyBuilder::new()
        .with_prefixes(&["k", "g"])
        .with_thresholds(&[0.1, 0.1])
        .with_intermediate_taxonomy(true)
        .build(&tree)
        .unwrap();
    assert_eq!(taxonomy.get("A").unwrap().labels, taxonomy.get("B").unwrap().labels);
    assert_eq!(taxonomy.get("A").unwrap().labels[0], "gHalo");
}

#[test]
fn test_intermediate_taxonomy() {
    let tree = parse_str(NESTED).unwrap();
    let taxonomy = RankedTaxonomyBuilder::new()
        .with_prefixes(&["k", "g"])
        .with_thresholds(&[10.0, 0.1])
        .with_intermediate_taxonomy(true)
        .build(&tree)
        .unwrap();
    assert_eq!(taxonomy.get("A").unwrap().taxonomy, "k__Root; g__oa.fb.gc");
    assert_eq!(taxonomy.get("B").unwrap().taxonomy, "k__Root; g__oa.fb.gc");
    assert_eq!(taxonomy.get("C").unwrap().taxonomy, "k__Root; g__oa.fb");
    assert_eq!(taxonomy.get("E").unwrap().taxonomy, "k__Root; g__Root");
}

#[test]
fn test_rank_count_mismatch() {
    let tree = parse_str(NESTED).unwrap();
    let result = RankedTaxonomyBuilder::new()
        .with_thresholds(&[1.0, 0.5])
        .build(&tree);
    assert!(matches!(
        result,
        Err(Tree2TaxError::InvalidRankCount { ranks: 7, thresholds: 2 })
    ));
}

#[test]
fn test_default_ranks_cover_every_tip() {
    let tree = parse_str(NESTED).unwrap();
    let taxonomy = RankedTaxonomyBuilder::new().build(&tree).unwrap();
    assert_eq!(taxonomy.tips().len(), 5);
    for tip in taxonomy.tips() {
        assert_eq!(tip.labels.len(), 7);
        assert!(tip.taxonomy.starts_with("k__"));
        assert_eq!(tip.taxonomy.matches("; ").count(), 6);
    }
}
