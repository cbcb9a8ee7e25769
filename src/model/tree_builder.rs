//! Seam between the Newick reader and the tree type it fills.
//!
//! The reader reports vertices bottom-up; a [`TreeBuilder`] decides how they
//! are stored. [`PhyloTreeBuilder`](crate::model::PhyloTreeBuilder) fills a
//! [`PhyloTree`](crate::model::PhyloTree).
//!
//! One builder serves any number of trees in a row:
//!
//! ```text
//! idle ─ init_next ─→ open ─ add_tip / add_internal ... add_root ─→ finish_tree ─→ idle
//! ```

// =#========================================================================#=
// TREE BUILDER (trait)
// =#========================================================================T=
/// Receives the vertices of one tree at a time, children before parents.
///
/// Branch lengths arrive already checked to be non-negative and finite.
pub trait TreeBuilder {
    /// Handle for a vertex added earlier, used to attach it to its parent.
    type VertexIdx: Copy;

    /// What [finish_tree](Self::finish_tree) hands out.
    type Tree;

    /// Starts a new tree, expecting about `num_vertices` vertices.
    fn init_next(&mut self, num_vertices: usize);

    /// Adds a vertex without children.
    fn add_tip(&mut self, name: Option<String>, branch_len: Option<f64>) -> Self::VertexIdx;

    /// Adds a vertex above `children`, which keep their input order.
    /// A single child is allowed.
    ///
    /// # Arguments
    /// * `name` - Internal label, i.e. taxonomy and/or support value
    /// * `branch_len` - Length of the branch above the vertex
    fn add_internal(
        &mut self,
        children: &[Self::VertexIdx],
        name: Option<String>,
        branch_len: Option<f64>,
    ) -> Self::VertexIdx;

    /// Adds the root above `children`; for a tree that is a single label,
    /// `children` is empty.
    fn add_root(
        &mut self,
        children: &[Self::VertexIdx],
        name: Option<String>,
        branch_len: Option<f64>,
    ) -> Self::VertexIdx;

    /// Hands out the tree built since [init_next](Self::init_next), if any.
    fn finish_tree(&mut self) -> Option<Self::Tree>;
}
