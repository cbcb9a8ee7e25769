//! Data model for rooted phylogenetic trees.
//!
//! # Tree representation
//! Trees are represented by [PhyloTree], which uses the arena pattern to store
//! [Vertex] nodes referenced by [VertexIndex]. Vertices may have any number of
//! children and carry an optional name and [BranchLength].
//!
//! The arena is what makes destructive clustering safe: detaching a vertex
//! never frees or moves it, so a pruned copy of a tree still shares every
//! index with the untouched original.
//!
//! # Building trees
//! Trees are typically constructed during parsing via the [TreeBuilder]
//! trait, which decouples the Newick parser from the tree type:
//!
//! - [PhyloTreeBuilder] → [PhyloTree]

pub mod phylo_tree_builder;
pub mod tree;
pub mod tree_builder;
pub mod vertex;

pub use phylo_tree_builder::PhyloTreeBuilder;
pub use tree::{NodeId, PhyloTree, VertexIndex};
pub use tree_builder::TreeBuilder;
pub use vertex::{BranchLength, Vertex};
