//! Arena-backed rooted tree with the queries clustering and threshold
//! finding need.
//!
//! * [PhyloTree] - Rooted, multifurcating tree
//! * [VertexIndex] - Slot of a vertex in the arena
//! * [NodeId] - Post-order number, stable across tree copies

use crate::error::{Result, Tree2TaxError};
use crate::model::vertex::{BranchLength, Vertex};
use std::collections::HashSet;
use std::fmt::Write;

/// Index of a vertex in a tree (arena).
pub type VertexIndex = usize;

/// Post-order identifier of a vertex, see [PhyloTree::assign_ids].
pub type NodeId = usize;

// =$========================================================================$=
// TREE
// =$========================================================================$=
/// A rooted phylogenetic tree represented using the arena pattern
/// on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by
/// [VertexIndex]. Aim is to avoid referencing troubles while the clustering
/// detaches vertices, and to keep indices valid across copies: a clone of a
/// tree has the same vertex at the same index, so vertices of a destructively
/// pruned copy map straight back to the original.
///
/// # Structure
/// - All vertices ever added stay in the arena; detached vertices are simply
///   unreachable from the root.
/// - Vertices may have any number of children, including one.
/// - Branch lengths are optional, but if provided must be non-negative.
///
/// # Construction
/// Add vertices with [`add_vertex()`](Self::add_vertex), link them with
/// [`add_child()`](Self::add_child) and finally mark the root with
/// [`set_root()`](Self::set_root). Usually this is done by the Newick parser
/// through [PhyloTreeBuilder](crate::model::PhyloTreeBuilder).
#[derive(Debug, Clone, Default)]
pub struct PhyloTree {
    /// Every vertex ever added, attached or not
    vertices: Vec<Vertex>,

    /// Set once parsing completes
    root_index: Option<VertexIndex>,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl PhyloTree {
    /// Creates a new empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty tree with room for `num_vertices` vertices.
    pub fn with_capacity(num_vertices: usize) -> Self {
        PhyloTree {
            vertices: Vec::with_capacity(num_vertices),
            root_index: None,
        }
    }

    /// Adds a detached vertex to the tree, assigning a unique index,
    /// which gets returned.
    ///
    /// # Arguments
    /// * `name` - Optional name (tip identifier or taxonomy annotation)
    /// * `branch_length` - Length of incoming branch, i.e. distance to parent
    pub fn add_vertex(&mut self, name: Option<String>, branch_length: Option<BranchLength>) -> VertexIndex {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new(index, name, branch_length));
        index
    }

    /// Appends `child` to the children of `parent` and sets its parent.
    ///
    /// # Panics
    /// Panics if either index is out of bounds.
    pub fn add_child(&mut self, parent: VertexIndex, child: VertexIndex) {
        self.vertices[parent].push_child(child);
        self.vertices[child].set_parent(Some(parent));
    }

    /// Marks the vertex at `index` as root of the tree.
    pub fn set_root(&mut self, index: VertexIndex) {
        self.root_index = Some(index);
    }

    /// Whether [set_root](Self::set_root) has been called.
    pub fn is_root_set(&self) -> bool {
        self.root_index.is_some()
    }

    /// Index of the root vertex.
    ///
    /// # Panics
    /// Panics on a tree still under construction (no root set).
    pub fn root_index(&self) -> VertexIndex {
        self.root_index.expect("root of tree not set")
    }

    /// The root vertex.
    ///
    /// # Panics
    /// Panics on a tree still under construction (no root set).
    pub fn root(&self) -> &Vertex {
        &self[self.root_index()]
    }

    /// Same as indexing with `tree[index]`.
    pub fn vertex(&self, index: VertexIndex) -> &Vertex {
        &self[index]
    }

    /// Returns the number of vertices in the arena, attached or not.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of tips reachable from the root.
    pub fn num_tips(&self) -> usize {
        self.pre_order_iter().filter(|v| v.is_tip()).count()
    }

    /// Returns the indices of all tips reachable from the root, in pre-order.
    pub fn tips(&self) -> Vec<VertexIndex> {
        self.pre_order_iter()
            .filter(|v| v.is_tip())
            .map(|v| v.index())
            .collect()
    }

    /// Returns the tips of the subtree rooted at `index`, in pre-order.
    ///
    /// A tip yields only itself.
    pub fn subtree_tips(&self, index: VertexIndex) -> Vec<VertexIndex> {
        self.tips_excluding(index, &HashSet::new())
    }

    /// Returns the tips of the subtree rooted at `index`, without descending
    /// into any vertex in `stop` (other than `index` itself).
    pub fn tips_excluding(&self, index: VertexIndex, stop: &HashSet<VertexIndex>) -> Vec<VertexIndex> {
        let mut tips = Vec::new();
        let mut stack = vec![index];
        while let Some(current) = stack.pop() {
            if current != index && stop.contains(&current) {
                continue;
            }
            let vertex = &self[current];
            if vertex.is_tip() {
                tips.push(current);
            } else {
                stack.extend(vertex.children().iter().rev());
            }
        }
        tips
    }

    /// Returns internal vertices of the subtree rooted at `index`, in pre-order.
    ///
    /// # Arguments
    /// * `include_self` - Whether `index` itself is reported (if internal)
    pub fn non_tips(&self, index: VertexIndex, include_self: bool) -> Vec<VertexIndex> {
        self.pre_order_iter_from(index)
            .filter(|v| !v.is_tip())
            .map(|v| v.index())
            .filter(|&i| include_self || i != index)
            .collect()
    }

    /// Returns an iterator over the proper ancestors of `index`,
    /// from its parent up to the root.
    pub fn ancestors(&self, index: VertexIndex) -> AncestorIter<'_> {
        AncestorIter {
            tree: self,
            current: self[index].parent(),
        }
    }

    /// Detaches `child` from `parent`.
    ///
    /// The detached vertex keeps its arena slot (and its own subtree links),
    /// so indices stay valid.
    ///
    /// # Returns
    /// `true` if `child` was a child of `parent` and got removed, `false` otherwise.
    pub fn remove_child(&mut self, parent: VertexIndex, child: VertexIndex) -> bool {
        if !self.vertices[parent].detach_child(child) {
            return false;
        }
        self.vertices[child].set_parent(None);
        true
    }

    /// Numbers all vertices reachable from the root in post-order,
    /// starting at 0. Ids survive cloning of the tree.
    pub fn assign_ids(&mut self) {
        let order: Vec<VertexIndex> = self.post_order_iter().map(|v| v.index()).collect();
        for (id, index) in order.into_iter().enumerate() {
            self.vertices[index].set_id(id);
        }
    }

    /// Returns the sum of branch lengths on the path from `index` up to
    /// `ancestor` (0 if both are the same vertex).
    ///
    /// # Errors
    /// [Tree2TaxError::DisconnectedNodes] if `ancestor` is not an ancestor of `index`.
    pub fn accumulate_to_ancestor(&self, index: VertexIndex, ancestor: VertexIndex) -> Result<f64> {
        let mut distance = 0.0;
        let mut current = index;
        while current != ancestor {
            let vertex = &self[current];
            distance += vertex.length();
            current = vertex.parent().ok_or(Tree2TaxError::DisconnectedNodes {
                descendant: index,
                ancestor,
            })?;
        }
        Ok(distance)
    }

    /// Returns the lowest common ancestor of `first` and `second`
    /// by intersecting their ancestor chains (each vertex counts as its own
    /// ancestor).
    ///
    /// # Errors
    /// [Tree2TaxError::NoCommonAncestor] if the chains never meet.
    pub fn lowest_common_ancestor(&self, first: VertexIndex, second: VertexIndex) -> Result<VertexIndex> {
        let first_ancestors: HashSet<VertexIndex> =
            std::iter::once(first).chain(self.ancestors(first)).collect();

        std::iter::once(second)
            .chain(self.ancestors(second))
            .find(|a| first_ancestors.contains(a))
            .ok_or(Tree2TaxError::NoCommonAncestor(first, second))
    }

    /// Returns the index of the first vertex (in pre-order) with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<VertexIndex> {
        self.pre_order_iter()
            .find(|v| v.name() == Some(name))
            .map(|v| v.index())
    }

    /// Checks that parent and child links agree for every vertex reachable
    /// from the root and that the root has no parent.
    pub fn is_valid(&self) -> bool {
        let Some(root_index) = self.root_index else {
            return false;
        };
        if root_index >= self.vertices.len() || self[root_index].parent().is_some() {
            return false;
        }

        for vertex in self.pre_order_iter() {
            for &child in vertex.children() {
                if child >= self.vertices.len() || self[child].parent() != Some(vertex.index()) {
                    return false;
                }
            }
        }

        true
    }
}

impl std::ops::Index<VertexIndex> for PhyloTree {
    type Output = Vertex;

    fn index(&self, index: VertexIndex) -> &Self::Output {
        &self.vertices[index]
    }
}

// ============================================================================
// Debug output (pub)
// ============================================================================
impl PhyloTree {
    /// Draws the attached part of the tree, one vertex per line, as logged
    /// after each clustering pass.
    ///
    /// # Example Output
    /// ```text
    /// [4] root
    /// ├─ [2] C :0.100
    /// │  ├─ [0] A :0.110
    /// │  └─ [1] B :0.120
    /// └─ [3] D :0.200
    /// ```
    pub fn ascii_art(&self) -> String {
        let Some(root_index) = self.root_index else {
            return "(empty tree)\n".to_string();
        };

        let mut art = String::new();
        // (vertex, indentation of its children, own connector)
        let mut stack = vec![(root_index, String::new(), "")];
        while let Some((index, indent, connector)) = stack.pop() {
            let vertex = &self[index];
            let _ = write!(art, "{}{}[{}] {}", indent, connector, index, vertex.name().unwrap_or("-"));
            if let Some(length) = vertex.branch_length() {
                let _ = write!(art, " :{:.3}", *length);
            }
            art.push('\n');

            let child_indent = match connector {
                "" => indent,
                "├─ " => format!("{}│  ", indent),
                _ => format!("{}   ", indent),
            };
            let children = vertex.children();
            for (i, &child) in children.iter().enumerate().rev() {
                let child_connector = if i + 1 == children.len() { "└─ " } else { "├─ " };
                stack.push((child, child_indent.clone(), child_connector));
            }
        }
        art
    }
}

// =$========================================================================$=
// ITERATORS
// =$========================================================================$=
impl PhyloTree {
    /// Visits the attached vertices children first, the order used by
    /// [assign_ids](Self::assign_ids).
    ///
    /// Only vertices reachable from the root are visited.
    pub fn post_order_iter(&self) -> PostOrderIter<'_> {
        PostOrderIter::new(self, self.root_index)
    }

    /// Visits the attached vertices parents first, the order clusters are
    /// reported in.
    ///
    /// Only vertices reachable from the root are visited.
    pub fn pre_order_iter(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self, self.root_index)
    }

    /// Returns a pre-order iterator over the subtree rooted at `index`.
    pub fn pre_order_iter_from(&self, index: VertexIndex) -> PreOrderIter<'_> {
        PreOrderIter::new(self, Some(index))
    }
}

/// Yields every vertex below a start vertex after all of its descendants,
/// children in input order. Uses an explicit stack, so deep caterpillar trees
/// cannot overflow the call stack.
pub struct PostOrderIter<'a> {
    tree: &'a PhyloTree,
    /// Vertex and whether its children are already on the stack
    stack: Vec<(VertexIndex, bool)>,
}

impl<'a> PostOrderIter<'a> {
    fn new(tree: &'a PhyloTree, start: Option<VertexIndex>) -> Self {
        PostOrderIter {
            tree,
            stack: start.map(|s| (s, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PostOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, expanded) = self.stack.pop()?;
            let vertex = &self.tree[index];
            if expanded || vertex.is_tip() {
                return Some(vertex);
            }
            self.stack.push((index, true));
            self.stack.extend(vertex.children().iter().rev().map(|&c| (c, false)));
        }
    }
}

/// Yields every vertex below a start vertex before its descendants,
/// children in input order.
pub struct PreOrderIter<'a> {
    tree: &'a PhyloTree,
    stack: Vec<VertexIndex>,
}

impl<'a> PreOrderIter<'a> {
    fn new(tree: &'a PhyloTree, start: Option<VertexIndex>) -> Self {
        PreOrderIter {
            tree,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a Vertex;

    fn next(&mut self) -> Option<Self::Item> {
        let vertex = &self.tree[self.stack.pop()?];
        self.stack.extend(vertex.children().iter().rev());
        Some(vertex)
    }
}

/// Iterator walking from a vertex's parent up to the root.
pub struct AncestorIter<'a> {
    tree: &'a PhyloTree,
    current: Option<VertexIndex>,
}

impl Iterator for AncestorIter<'_> {
    type Item = VertexIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.current?;
        self.current = self.tree[index].parent();
        Some(index)
    }
}
