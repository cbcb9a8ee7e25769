//! Assembling a full rank-by-rank taxonomy for every tip of a tree.
//!
//! The tree is clustered once per rank, with one threshold per rank from
//! kingdom (largest) down to species (smallest). Each tip is then labelled at
//! every rank with the condensed name of its cluster, giving strings such as
//! `k__Root; p__pEury; ...; s__gHalo.2`.

use crate::cluster::{ClusterEngine, NamedCluster, ThresholdAndClusters};
use crate::error::{Result, Tree2TaxError};
use crate::model::{PhyloTree, VertexIndex};
use crate::taxonomy::{CONDENSED_SEPARATOR, RANK_SEPARATOR, missing_taxonomy};
use tracing::info;

/// Rank prefixes from kingdom to species.
pub const DEFAULT_RANK_PREFIXES: [&str; 7] = ["k", "p", "c", "o", "f", "g", "s"];

/// Tree distance thresholds for [DEFAULT_RANK_PREFIXES], kingdom to species.
pub const DEFAULT_THRESHOLDS: [f64; 7] = [1.4, 0.82, 0.42, 0.27, 0.15, 0.12, 0.08];

// =#========================================================================#=
// RANKED TAXONOMY BUILDER
// =#========================================================================#=
/// Builder for [RankedTaxonomy], configuring ranks and their thresholds.
///
/// # Example
/// ```
/// use tree2tax::newick::parse_str;
/// use tree2tax::ranks::RankedTaxonomyBuilder;
///
/// let tree = parse_str("((A:0.01,B:0.01)'g__Halo':0.5,C:0.5)root;")?;
/// let taxonomy = RankedTaxonomyBuilder::new()
///     .with_prefixes(&["f", "g"])
///     .with_thresholds(&[1.5, 0.1])
///     .build(&tree)?;
/// assert_eq!(taxonomy.tips()[0].taxonomy, "f__Root; g__gHalo");
/// # Ok::<(), tree2tax::Tree2TaxError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RankedTaxonomyBuilder {
    prefixes: Vec<String>,
    thresholds: Vec<f64>,
    intermediate_taxonomy: bool,
}

impl Default for RankedTaxonomyBuilder {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_RANK_PREFIXES.iter().map(|p| p.to_string()).collect(),
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            intermediate_taxonomy: false,
        }
    }
}

impl RankedTaxonomyBuilder {
    /// Creates a builder with the seven default ranks and thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rank prefixes, coarsest first.
    pub fn with_prefixes<S: AsRef<str>>(mut self, prefixes: &[S]) -> Self {
        self.prefixes = prefixes.iter().map(|p| p.as_ref().to_string()).collect();
        self
    }

    /// Sets one threshold per rank, coarsest rank first. Thresholds must not
    /// increase from one rank to the next.
    pub fn with_thresholds(mut self, thresholds: &[f64]) -> Self {
        self.thresholds = thresholds.to_vec();
        self
    }

    /// Whether a rank label is replaced by the annotation found between the
    /// cluster's labelled ancestor and that of the next coarser rank.
    ///
    /// Default: `false`
    pub fn with_intermediate_taxonomy(mut self, intermediate_taxonomy: bool) -> Self {
        self.intermediate_taxonomy = intermediate_taxonomy;
        self
    }

    /// Clusters `tree` at every rank and labels all tips.
    ///
    /// # Errors
    /// [Tree2TaxError::InvalidRankCount] if the number of prefixes and
    /// thresholds differ. [Tree2TaxError::InvalidThreshold] for the first
    /// threshold larger than the one of the coarser rank before it.
    /// Clustering errors are passed on.
    pub fn build(&self, tree: &PhyloTree) -> Result<RankedTaxonomy> {
        if self.prefixes.len() != self.thresholds.len() {
            return Err(Tree2TaxError::InvalidRankCount {
                ranks: self.prefixes.len(),
                thresholds: self.thresholds.len(),
            });
        }

        // A finer rank must never cluster wider than the rank above it
        if let Some(w) = self.thresholds.windows(2).find(|w| w[1] > w[0]) {
            return Err(Tree2TaxError::InvalidThreshold(w[1]));
        }

        // Finest rank first, then back to coarsest first
        let mut engine = ClusterEngine::new(tree);
        let mut per_rank = self
            .thresholds
            .iter()
            .rev()
            .map(|&threshold| engine.cluster_at(threshold))
            .collect::<Result<Vec<ThresholdAndClusters>>>()?;
        per_rank.reverse();

        let original = engine.original();
        let mut tips = Vec::with_capacity(original.num_tips());
        for tip in original.tips() {
            let clusters: Vec<&NamedCluster> = per_rank.iter().filter_map(|r| r.tip_to_cluster(tip)).collect();
            let labels = self.labels(original, &clusters)?;
            let taxonomy = self
                .prefixes
                .iter()
                .zip(&labels)
                .map(|(prefix, label)| format!("{}__{}", prefix, label))
                .collect::<Vec<_>>()
                .join(RANK_SEPARATOR);
            tips.push(TipTaxonomy {
                index: tip,
                name: original[tip].name().map(str::to_string),
                labels,
                taxonomy,
            });
        }
        info!("Assigned taxonomy at {} ranks to {} tips", self.prefixes.len(), tips.len());

        Ok(RankedTaxonomy {
            prefixes: self.prefixes.clone(),
            tips,
        })
    }

    /// Label of a tip at each rank, given its cluster at each rank.
    fn labels(&self, tree: &PhyloTree, clusters: &[&NamedCluster]) -> Result<Vec<String>> {
        let mut labels = Vec::with_capacity(clusters.len());
        for (i, cluster) in clusters.iter().enumerate() {
            let intermediate = match i.checked_sub(1) {
                Some(coarser) if self.intermediate_taxonomy => {
                    missing_taxonomy(tree, cluster.taxonomy_node(), clusters[coarser].taxonomy_node())?
                }
                _ => Vec::new(),
            };
            let taxonomy_override = Some(intermediate.join(CONDENSED_SEPARATOR)).filter(|s| !s.is_empty());
            labels.push(cluster.condensed_name(taxonomy_override.as_deref()));
        }
        Ok(labels)
    }
}

// =#========================================================================#=
// RANKED TAXONOMY
// =#========================================================================#=
/// Taxonomy of one tip, with one label per rank.
#[derive(Debug, Clone, PartialEq)]
pub struct TipTaxonomy {
    /// Index of the tip in the tree
    pub index: VertexIndex,
    /// Name of the tip, if any
    pub name: Option<String>,
    /// Label at each rank, coarsest first, without rank prefix
    pub labels: Vec<String>,
    /// Labels joined as `k__label; p__label; ...`
    pub taxonomy: String,
}

/// Rank-by-rank taxonomy of all tips of a tree, in pre-order.
#[derive(Debug, Clone)]
pub struct RankedTaxonomy {
    prefixes: Vec<String>,
    tips: Vec<TipTaxonomy>,
}

impl RankedTaxonomy {
    /// Returns the rank prefixes, coarsest first.
    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// Returns the taxonomy of every tip.
    pub fn tips(&self) -> &[TipTaxonomy] {
        &self.tips
    }

    /// Returns the taxonomy of the tip with the given name.
    pub fn get(&self, name: &str) -> Option<&TipTaxonomy> {
        self.tips.iter().find(|t| t.name.as_deref() == Some(name))
    }
}
