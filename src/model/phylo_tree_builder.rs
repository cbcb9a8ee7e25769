//! Provides [TreeBuilder] implementation for [PhyloTree].

use crate::model::tree_builder::TreeBuilder;
use crate::model::vertex::BranchLength;
use crate::model::{PhyloTree, VertexIndex};

/// Builder that constructs [PhyloTree] instances.
///
/// # Example
/// ```
/// use tree2tax::model::PhyloTreeBuilder;
/// use tree2tax::newick::NewickParser;
/// use tree2tax::parser::ByteParser;
///
/// let mut byte_parser = ByteParser::for_str("(A:1,(B:1,C:2)'g__Halo':0.5)root;");
/// let mut parser = NewickParser::new(PhyloTreeBuilder::new());
/// let tree = parser.parse_str(&mut byte_parser)?;
/// assert_eq!(tree.num_tips(), 3);
/// # Ok::<(), tree2tax::parser::ParsingError>(())
/// ```
#[derive(Debug, Default)]
pub struct PhyloTreeBuilder {
    current_tree: Option<PhyloTree>,
}

impl PhyloTreeBuilder {
    /// Creates a new builder in the empty state.
    pub fn new() -> Self {
        Self { current_tree: None }
    }

    fn tree(&mut self) -> &mut PhyloTree {
        self.current_tree.get_or_insert_with(PhyloTree::new)
    }

    fn add_with_children(
        &mut self,
        children: &[VertexIndex],
        name: Option<String>,
        branch_len: Option<f64>,
    ) -> VertexIndex {
        let tree = self.tree();
        let index = tree.add_vertex(name, branch_len.map(BranchLength::new));
        for &child in children {
            tree.add_child(index, child);
        }
        index
    }
}

impl TreeBuilder for PhyloTreeBuilder {
    type VertexIdx = VertexIndex;
    type Tree = PhyloTree;

    fn init_next(&mut self, num_vertices: usize) {
        self.current_tree = Some(PhyloTree::with_capacity(num_vertices));
    }

    fn add_tip(&mut self, name: Option<String>, branch_len: Option<f64>) -> VertexIndex {
        self.tree().add_vertex(name, branch_len.map(BranchLength::new))
    }

    fn add_internal(
        &mut self,
        children: &[VertexIndex],
        name: Option<String>,
        branch_len: Option<f64>,
    ) -> VertexIndex {
        self.add_with_children(children, name, branch_len)
    }

    fn add_root(
        &mut self,
        children: &[VertexIndex],
        name: Option<String>,
        branch_len: Option<f64>,
    ) -> VertexIndex {
        let index = self.add_with_children(children, name, branch_len);
        self.tree().set_root(index);
        index
    }

    fn finish_tree(&mut self) -> Option<PhyloTree> {
        self.current_tree.take()
    }
}
