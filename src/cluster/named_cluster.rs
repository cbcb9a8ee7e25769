//! Clusters emitted for one threshold, and lookups from tips to clusters.

use crate::model::{NodeId, VertexIndex};
use crate::taxonomy::{CONDENSED_SEPARATOR, condense};
use std::cell::OnceCell;
use std::collections::HashMap;
use tracing::warn;

// =#========================================================================#=
// CLUSTER TIP
// =#========================================================================#=
/// A tip of the original tree that is a member of a [NamedCluster].
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTip {
    /// Index of the tip in the original tree
    pub index: VertexIndex,
    /// Post-order id of the tip in the original tree
    pub id: NodeId,
    /// Name of the tip, if any
    pub name: Option<String>,
}

// =#========================================================================#=
// NAMED CLUSTER
// =#========================================================================#=
/// A group of tips clustered together at one threshold, labelled with the
/// taxonomy of the nearest annotated ancestor.
///
/// If several clusters of the same threshold share a taxonomy, they are told
/// apart by their `cluster_number`, where 1 is the cluster with most tips.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedCluster {
    pub(crate) taxonomy: String,
    pub(crate) tips: Vec<ClusterTip>,
    pub(crate) lca: VertexIndex,
    pub(crate) taxonomy_node: VertexIndex,
    pub(crate) cluster_number: Option<usize>,
}

impl NamedCluster {
    /// Returns the taxonomy label, `"Root"` if no ancestor carries one.
    pub fn taxonomy(&self) -> &str {
        &self.taxonomy
    }

    /// Returns the member tips, in pre-order of the original tree.
    pub fn tips(&self) -> &[ClusterTip] {
        &self.tips
    }

    /// Returns the names of the member tips (unnamed tips are skipped).
    pub fn tip_names(&self) -> Vec<&str> {
        self.tips.iter().filter_map(|t| t.name.as_deref()).collect()
    }

    /// Returns the vertex whose original subtree makes up this cluster
    /// (a tip for singleton clusters).
    pub fn lca(&self) -> VertexIndex {
        self.lca
    }

    /// Returns the vertex the taxonomy label was taken from
    /// (the root for `"Root"` clusters).
    pub fn taxonomy_node(&self) -> VertexIndex {
        self.taxonomy_node
    }

    /// Returns the 1-based number among clusters sharing the taxonomy, or
    /// `None` if the taxonomy is unique at this threshold.
    pub fn cluster_number(&self) -> Option<usize> {
        self.cluster_number
    }

    /// Returns the taxonomy, followed by `.N` if the cluster is numbered.
    pub fn name(&self) -> String {
        with_number(self.taxonomy.clone(), self.cluster_number)
    }

    /// Returns the condensed taxonomy (or the given override), followed by
    /// `.N` if the cluster is numbered.
    ///
    /// # Example
    /// ```
    /// # use tree2tax::newick::parse_str;
    /// # use tree2tax::cluster::named_clusters;
    /// let tree = parse_str("((A:1,B:1)'c__Halo; o__fu':1,C:1)root;")?;
    /// let clusters = named_clusters(&tree, 0.5)?;
    /// assert_eq!(clusters.clusters()[0].condensed_name(None), "cHalo.ofu.1");
    /// assert_eq!(clusters.clusters()[0].condensed_name(Some("gX")), "gX.1");
    /// # Ok::<(), tree2tax::Tree2TaxError>(())
    /// ```
    pub fn condensed_name(&self, taxonomy_override: Option<&str>) -> String {
        let base = match taxonomy_override {
            Some(taxonomy) => taxonomy.to_string(),
            None => condense(&self.taxonomy),
        };
        with_number(base, self.cluster_number)
    }

    /// Smallest original tip id, used to order clusters of equal size.
    pub(crate) fn min_tip_id(&self) -> NodeId {
        self.tips.iter().map(|t| t.id).min().unwrap_or(NodeId::MAX)
    }
}

fn with_number(mut base: String, cluster_number: Option<usize>) -> String {
    if let Some(number) = cluster_number {
        base.push_str(CONDENSED_SEPARATOR);
        base.push_str(&number.to_string());
    }
    base
}

// =#========================================================================#=
// THRESHOLD AND CLUSTERS
// =#========================================================================#=
/// All clusters found at one threshold, partitioning the tips of the tree.
///
/// Lookups from tips to clusters build their index on first use.
#[derive(Debug, Clone)]
pub struct ThresholdAndClusters {
    threshold: f64,
    clusters: Vec<NamedCluster>,
    by_tip_name: OnceCell<HashMap<String, usize>>,
    by_tip_index: OnceCell<HashMap<VertexIndex, usize>>,
}

impl ThresholdAndClusters {
    pub(crate) fn new(threshold: f64, clusters: Vec<NamedCluster>) -> Self {
        Self {
            threshold,
            clusters,
            by_tip_name: OnceCell::new(),
            by_tip_index: OnceCell::new(),
        }
    }

    /// Returns the threshold the clusters were computed for.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the clusters, in pre-order of the clustered tree.
    pub fn clusters(&self) -> &[NamedCluster] {
        &self.clusters
    }

    /// Consumes `self` and returns the clusters.
    pub fn into_clusters(self) -> Vec<NamedCluster> {
        self.clusters
    }

    /// Returns the cluster containing the tip with the given name.
    ///
    /// If several tips share the name, the cluster of the last one wins
    /// (a warning is logged when building the index).
    pub fn tip_name_to_cluster(&self, name: &str) -> Option<&NamedCluster> {
        let index = self.by_tip_name.get_or_init(|| {
            let mut index = HashMap::new();
            for (i, cluster) in self.clusters.iter().enumerate() {
                for name in cluster.tips.iter().filter_map(|t| t.name.as_ref()) {
                    if index.insert(name.clone(), i).is_some() {
                        warn!("Found duplicate tip name {:?}, keeping the last cluster seen", name);
                    }
                }
            }
            index
        });
        index.get(name).map(|&i| &self.clusters[i])
    }

    /// Returns the cluster containing the tip at `tip` of the original tree.
    pub fn tip_to_cluster(&self, tip: VertexIndex) -> Option<&NamedCluster> {
        let index = self.by_tip_index.get_or_init(|| {
            self.clusters
                .iter()
                .enumerate()
                .flat_map(|(i, cluster)| cluster.tips.iter().map(move |t| (t.index, i)))
                .collect()
        });
        index.get(&tip).map(|&i| &self.clusters[i])
    }
}
