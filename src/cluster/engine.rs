//! Clustering one tree at a series of ascending thresholds and naming the
//! resulting clusters.

use crate::cluster::destructive::{CladeDistances, destructively_cluster_tree};
use crate::cluster::named_cluster::{ClusterTip, NamedCluster, ThresholdAndClusters};
use crate::error::{Result, Tree2TaxError};
use crate::model::{PhyloTree, VertexIndex};
use crate::taxonomy::{ROOT_TAXONOMY, vertex_taxonomy};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{debug, info};

// =#========================================================================#=
// CLUSTER ENGINE
// =#========================================================================#=
/// Clusters a tree at non-decreasing thresholds, each threshold coarsening
/// the partition of the previous one.
///
/// The engine keeps an untouched copy of the tree (with post-order ids) and a
/// working copy that is pruned by every clustering pass. Both share vertex
/// indices, so tips of the working tree map straight back to the clades of
/// the original.
///
/// # Example
/// ```
/// use tree2tax::cluster::ClusterEngine;
/// use tree2tax::newick::parse_str;
///
/// let tree = parse_str("((A:0.11,B:0.12)C:0.1,D:0.2)root;")?;
/// let mut engine = ClusterEngine::new(&tree);
/// let fine = engine.cluster_at(0.05)?;
/// let coarse = engine.cluster_at(0.25)?;
/// assert_eq!(fine.clusters().len(), 3);
/// assert_eq!(coarse.clusters()[0].name(), "C");
/// # Ok::<(), tree2tax::Tree2TaxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    original: PhyloTree,
    working: PhyloTree,
    clade_distances: CladeDistances,
    last_threshold: Option<f64>,
}

impl ClusterEngine {
    /// Creates an engine for a copy of `tree`.
    ///
    /// # Panics
    /// Panics if the root of `tree` is not set.
    pub fn new(tree: &PhyloTree) -> Self {
        let mut original = tree.clone();
        original.assign_ids();
        let working = original.clone();
        Self {
            original,
            working,
            clade_distances: CladeDistances::new(),
            last_threshold: None,
        }
    }

    /// Returns the unpruned tree, with post-order ids assigned.
    pub fn original(&self) -> &PhyloTree {
        &self.original
    }

    /// Returns the working tree as pruned by the thresholds so far.
    pub fn working(&self) -> &PhyloTree {
        &self.working
    }

    /// Clusters the working tree further at `threshold` and names the
    /// resulting clusters.
    ///
    /// # Errors
    /// [Tree2TaxError::InvalidThreshold] if `threshold` is negative, NaN or
    /// smaller than the previous one. Errors of
    /// [destructively_cluster_tree] are passed on.
    pub fn cluster_at(&mut self, threshold: f64) -> Result<ThresholdAndClusters> {
        if self.last_threshold.is_some_and(|last| threshold < last) {
            return Err(Tree2TaxError::InvalidThreshold(threshold));
        }
        destructively_cluster_tree(&mut self.working, threshold, &mut self.clade_distances)?;
        self.last_threshold = Some(threshold);

        let clusters = self.name_clusters();
        info!("Found {} clusters at threshold {}", clusters.len(), threshold);
        Ok(ThresholdAndClusters::new(threshold, clusters))
    }

    /// Builds one [NamedCluster] per tip of the working tree and numbers
    /// clusters sharing a taxonomy.
    fn name_clusters(&self) -> Vec<NamedCluster> {
        let root = self.original.root_index();

        // Everything collapsed into the root
        if self.working.root().is_tip() {
            return vec![NamedCluster {
                taxonomy: ROOT_TAXONOMY.to_string(),
                tips: self.cluster_tips(root),
                lca: root,
                taxonomy_node: root,
                cluster_number: None,
            }];
        }

        let mut clusters: Vec<NamedCluster> = self
            .working
            .tips()
            .into_iter()
            .map(|lca| {
                let (taxonomy, taxonomy_node) = self.nearest_taxonomy(lca);
                NamedCluster {
                    taxonomy,
                    tips: self.cluster_tips(lca),
                    lca,
                    taxonomy_node,
                    cluster_number: None,
                }
            })
            .collect();

        let mut by_taxonomy: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, cluster) in clusters.iter().enumerate() {
            by_taxonomy.entry(cluster.taxonomy.as_str()).or_default().push(i);
        }
        let numbering: Vec<(usize, usize)> = by_taxonomy
            .into_values()
            .filter(|members| members.len() > 1)
            .flat_map(|mut members| {
                members.sort_by_key(|&i| (Reverse(clusters[i].tips.len()), clusters[i].min_tip_id()));
                members.into_iter().enumerate().map(|(rank, i)| (i, rank + 1))
            })
            .collect();
        for (i, number) in numbering {
            clusters[i].cluster_number = Some(number);
        }

        debug!(
            "Named clusters: {:?}",
            clusters.iter().map(NamedCluster::name).collect::<Vec<_>>()
        );
        clusters
    }

    /// Finds the closest ancestor of `lca` (itself included unless it is an
    /// original tip) that carries a taxonomy, falling back to the root.
    fn nearest_taxonomy(&self, lca: VertexIndex) -> (String, VertexIndex) {
        let tree = &self.original;
        let mut current = match tree[lca].parent() {
            Some(parent) if tree[lca].is_tip() => parent,
            _ => lca,
        };
        while let Some(parent) = tree[current].parent() {
            if let Some(taxonomy) = vertex_taxonomy(tree, current) {
                return (taxonomy.to_string(), current);
            }
            current = parent;
        }
        (ROOT_TAXONOMY.to_string(), current)
    }

    /// Returns the original tips below `lca`, or `lca` itself if it is one.
    fn cluster_tips(&self, lca: VertexIndex) -> Vec<ClusterTip> {
        self.original
            .subtree_tips(lca)
            .into_iter()
            .map(|index| {
                let tip = &self.original[index];
                ClusterTip {
                    index,
                    id: tip.id().unwrap_or(index),
                    name: tip.name().map(str::to_string),
                }
            })
            .collect()
    }
}

// ============================================================================
// Convenience functions (pub)
// ============================================================================
/// Clusters a copy of `tree` at a single threshold.
///
/// # Errors
/// See [ClusterEngine::cluster_at].
pub fn named_clusters(tree: &PhyloTree, threshold: f64) -> Result<ThresholdAndClusters> {
    ClusterEngine::new(tree).cluster_at(threshold)
}

/// Clusters a copy of `tree` at each threshold, smallest first, so that the
/// partitions are nested.
///
/// # Returns
/// One [ThresholdAndClusters] per threshold, sorted ascending by threshold.
///
/// # Errors
/// [Tree2TaxError::InvalidThreshold] if any threshold is negative or NaN.
pub fn named_clusters_for_several_thresholds(
    tree: &PhyloTree,
    thresholds: &[f64],
) -> Result<Vec<ThresholdAndClusters>> {
    if let Some(&invalid) = thresholds.iter().find(|t| t.is_nan() || **t < 0.0) {
        return Err(Tree2TaxError::InvalidThreshold(invalid));
    }
    let mut sorted = thresholds.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut engine = ClusterEngine::new(tree);
    sorted.into_iter().map(|t| engine.cluster_at(t)).collect()
}
