//! Destructive complete-linkage clustering of tree tips and naming of the
//! resulting clusters.
//!
//! # Algorithm
//! A working copy of the tree is pruned: whenever two sibling tips (with no
//! further siblings) are within the threshold of each other, both are
//! detached and their parent becomes a tip that may merge further up. The
//! distance of a collapsed clade is the distance to its farthest absorbed tip
//! (complete linkage). See [destructively_cluster_tree].
//!
//! Each tip of the pruned tree then stands for the tips of its subtree in the
//! original tree. A cluster is labelled with the taxonomy of its nearest
//! annotated ancestor, and clusters sharing a label are numbered by
//! decreasing size. See [ClusterEngine].
//!
//! # Several thresholds
//! Thresholds are applied smallest first to the same working tree, so the
//! partition at a larger threshold is always a coarsening of the one at a
//! smaller threshold:
//! * [named_clusters] - Single threshold
//! * [named_clusters_for_several_thresholds] - All thresholds, ascending
//! * [ClusterEngine::cluster_at] - One threshold at a time

mod destructive;
mod engine;
mod named_cluster;

pub use destructive::{CladeDistances, destructively_cluster_tree};
pub use engine::{ClusterEngine, named_clusters, named_clusters_for_several_thresholds};
pub use named_cluster::{ClusterTip, NamedCluster, ThresholdAndClusters};
