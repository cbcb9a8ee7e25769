//! Error type shared by threshold derivation and clustering.
//!
//! Each variant belongs to one of three families, so callers can tell bad
//! input from a malformed tree from a broken internal invariant:
//! * threshold input: [Tree2TaxError::ThresholdInconsistency],
//!   [Tree2TaxError::InvalidThreshold], [Tree2TaxError::InvalidRankCount]
//! * tree structure: [Tree2TaxError::DisconnectedNodes],
//!   [Tree2TaxError::NoCommonAncestor], [Tree2TaxError::Parsing]
//! * internal invariant: [Tree2TaxError::CorruptTree]

use crate::model::VertexIndex;
use crate::parser::ParsingError;
use thiserror::Error;

/// Errors raised while deriving thresholds or clustering a tree.
#[derive(Debug, Error)]
pub enum Tree2TaxError {
    /// Rank-wise median distances cannot be made monotonically non-increasing.
    #[error("failed to sanitise taxonomy-wise distances {0:?}")]
    ThresholdInconsistency(Vec<Option<f64>>),

    /// A clustering threshold is negative, not a number, or out of rank order.
    #[error("invalid clustering threshold {0}")]
    InvalidThreshold(f64),

    /// Number of rank prefixes does not match the number of thresholds.
    #[error("expected one threshold per rank ({ranks} ranks), got {thresholds}")]
    InvalidRankCount { ranks: usize, thresholds: usize },

    /// `ancestor` is not reachable by walking up from `descendant`.
    #[error("vertex {ancestor} is not an ancestor of vertex {descendant}, disconnected nodes")]
    DisconnectedNodes {
        descendant: VertexIndex,
        ancestor: VertexIndex,
    },

    /// Ancestor chains of two vertices never meet.
    #[error("no common ancestor found for vertices {0} and {1}, are they from the same tree?")]
    NoCommonAncestor(VertexIndex, VertexIndex),

    /// Working tree no longer matches the structure the clustering relies on.
    #[error("corrupt working tree: vertex {child} is not a child of vertex {parent}")]
    CorruptTree {
        parent: VertexIndex,
        child: VertexIndex,
    },

    /// Reading the input tree failed.
    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Tree2TaxError>;
