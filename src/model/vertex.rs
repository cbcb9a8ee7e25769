//! Vertex module for phylogenetic tree representation.

use crate::model::tree::{NodeId, VertexIndex};
use std::ops::Deref;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a rooted, possibly multifurcating,
/// phylogenetic tree.
///
/// A vertex is a tip exactly when it has no children. Since clustering
/// detaches children from internal vertices, a vertex can turn into a tip
/// of the working tree while remaining internal in the original tree.
///
/// # Invariants
/// - `index` is the position in the arena and never changes
/// - `id` is unset until [PhyloTree::assign_ids](crate::model::PhyloTree::assign_ids)
///   numbered the tree in post-order
/// - `children` keeps input order; a child's `parent` points back here
/// - `branch_length`, when present, is a valid [BranchLength]
#[derive(PartialEq, Debug, Clone)]
pub struct Vertex {
    /// Arena slot, fixed for the lifetime of the tree and its clones
    index: VertexIndex,
    /// Post-order identifier, stable across copies of the tree
    id: Option<NodeId>,
    /// Index of the parent vertex, `None` for the root (or detached vertices)
    parent: Option<VertexIndex>,
    /// Indices of the child vertices, in input order
    children: Vec<VertexIndex>,
    /// Name as given in the input, e.g. a tip identifier, a taxonomy
    /// string, a bootstrap value, or `'<support>:<taxonomy>'`
    name: Option<String>,
    /// Length of the branch to the parent, if the input gave one
    branch_length: Option<BranchLength>,
}

impl Vertex {
    /// Creates a vertex for arena slot `index`, without parent or children.
    pub fn new(index: VertexIndex, name: Option<String>, branch_length: Option<BranchLength>) -> Self {
        Vertex {
            index,
            id: None,
            parent: None,
            children: Vec::new(),
            name,
            branch_length,
        }
    }

    /// Arena slot of this vertex.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    /// Returns the post-order identifier, if ids have been assigned.
    pub fn id(&self) -> Option<NodeId> {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: NodeId) {
        self.id = Some(id);
    }

    /// Returns the name of this vertex, treating an empty name as absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Whether the input gave a length for the branch above.
    pub fn has_branch_length(&self) -> bool {
        self.branch_length.is_some()
    }

    /// Returns the branch length, if set.
    pub fn branch_length(&self) -> Option<BranchLength> {
        self.branch_length
    }

    /// Returns the branch length, reading a missing one as `0.0`.
    pub fn length(&self) -> f64 {
        self.branch_length.map_or(0.0, |bl| *bl)
    }

    /// Returns `true` if this vertex currently has no children.
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns `true` if this vertex has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns the (possibly empty) ordered list of child indices.
    pub fn children(&self) -> &[VertexIndex] {
        &self.children
    }

    /// Returns the index of the parent, or `None` for a root.
    pub fn parent(&self) -> Option<VertexIndex> {
        self.parent
    }

    pub(crate) fn set_parent(&mut self, parent: Option<VertexIndex>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: VertexIndex) {
        self.children.push(child);
    }

    /// Detaches `child` from the child list; returns whether it was there.
    pub(crate) fn detach_child(&mut self, child: VertexIndex) -> bool {
        match self.children.iter().position(|&c| c == child) {
            Some(position) => {
                self.children.remove(position);
                true
            }
            None => false,
        }
    }
}

// =#========================================================================#=
// BRANCH LENGTH
// =#========================================================================#=
/// Length of the branch above a vertex, in substitutions per site.
///
/// Non-negative and finite by construction; dereferences to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchLength(f64);

impl BranchLength {
    /// Wraps `length`.
    ///
    /// # Panics
    /// Panics if `length` is negative, infinite or NaN; use
    /// [try_new](Self::try_new) for unchecked input.
    pub fn new(length: f64) -> Self {
        match Self::try_new(length) {
            Some(branch_length) => branch_length,
            None => panic!("branch length must be non-negative and finite, got {}", length),
        }
    }

    /// Creates a branch length, returning `None` for negative or
    /// non-finite values instead of panicking.
    pub fn try_new(length: f64) -> Option<Self> {
        (length >= 0.0 && length.is_finite()).then_some(BranchLength(length))
    }
}

impl Deref for BranchLength {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}
