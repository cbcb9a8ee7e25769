//! Tree2tax partitions a phylogenetic tree into taxonomically consistent
//! clusters at tree-distance thresholds.
//!
//! Given a reference tree whose internal vertices are (partly) annotated with
//! taxonomy strings such as `'f__Halobacteriaceae; g__Halorubrum'`, the crate
//! assigns every tip a rank label at each threshold. Core functionality:
//! - Clustering: destructive complete-linkage collapsing of tip pairs under a
//!   distance threshold, applied at ascending thresholds so that partitions
//!   nest. See [crate::cluster].
//! - Naming: each cluster is labelled with the taxonomy of its nearest
//!   annotated ancestor; clusters sharing a label are numbered by size.
//! - Thresholds: deriving one threshold per rank from sister clades found in
//!   the annotation itself. See [crate::threshold].
//! - Ranks: assembling `k__...; p__...; ...; s__...` strings per tip.
//!   See [crate::ranks].
//! - Input: multifurcating Newick trees with internal labels, quoted labels,
//!   comments and bootstrap values. See [crate::newick].
//!
//! Trees use the arena pattern (see [crate::model]): vertices are referenced
//! by index, and a pruned copy of a tree shares all indices with the original.
//!
//! # Example
//! ```
//! use tree2tax::{named_clusters, parse_newick_str};
//!
//! let tree = parse_newick_str("((A:0.11,B:0.12)C:0.1,D:0.2)root;")?;
//! let result = named_clusters(&tree, 0.05)?;
//! let names: Vec<String> = result.clusters().iter().map(|c| c.name()).collect();
//! assert_eq!(names, vec!["C.1", "C.2", "Root"]);
//! # Ok::<(), tree2tax::Tree2TaxError>(())
//! ```
//!
//! # Logging
//! The crate reports progress through [tracing] events and never installs a
//! subscriber itself.

pub mod cluster;
pub mod error;
pub mod model;
pub mod newick;
pub mod parser;
pub mod ranks;
pub mod taxonomy;
pub mod threshold;

pub use crate::cluster::{NamedCluster, ThresholdAndClusters, named_clusters, named_clusters_for_several_thresholds};
pub use crate::error::{Result, Tree2TaxError};
pub use crate::threshold::ThresholdFinder;

use crate::model::PhyloTree;
use crate::parser::parsing_error::ParsingError;
use std::path::Path;

// ============================================================================
// Quick Newick API
// ============================================================================
/// Parse a Newick string using default settings, returning a [PhyloTree].
///
/// See [`newick::parse_str`] for full documentation of this convenience function.
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> std::result::Result<PhyloTree, ParsingError> {
    newick::parse_str(newick)
}

/// Parse the first tree of a Newick file using default settings,
/// returning a [PhyloTree].
///
/// See [`newick::parse_file`] for full documentation of this convenience function.
pub fn parse_newick_file<P: AsRef<Path>>(path: P) -> std::result::Result<PhyloTree, ParsingError> {
    newick::parse_file(path)
}
