//! Recursive-descent reader turning Newick text into trees.
//!
//! [NewickParser] walks the clades of a tree depth-first and hands every
//! vertex to a [TreeBuilder] as soon as its subtree is complete, so children
//! always reach the builder before their parent.

use crate::model::tree_builder::TreeBuilder;
use crate::newick::defs::{DEFAULT_NUM_VERTICES_GUESS, NEWICK_LABEL_DELIMITERS};
use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;
use crate::parser::parsing_error::ParsingError;

/// Label and branch length following a vertex (or its closing parenthesis).
struct VertexSuffix {
    label: Option<String>,
    branch_length: Option<f64>,
}

// =#========================================================================#=
// NEWICK PARSER
// =#========================================================================$=
/// Reads Newick trees of any degree, with labels on tips and internal
/// vertices alike.
///
/// Internal labels are where reference trees keep their taxonomy
/// (`'f__Halobacteriaceae'`), support values (`95`) or both (`'95:f__...'`).
/// They are passed on verbatim; interpreting them is left to
/// [taxonomy](crate::taxonomy).
///
/// # Example
/// ```
/// use tree2tax::model::PhyloTreeBuilder;
/// use tree2tax::newick::NewickParser;
/// use tree2tax::parser::ByteParser;
///
/// let input = "(((A:1, B:2)'g__genus1':3, (C:4, D:5)'g__genus2':6)'f__family':10)root;";
/// let mut source = ByteParser::for_str(input);
/// let mut reader = NewickParser::new(PhyloTreeBuilder::new());
///
/// let tree = reader.parse_str(&mut source)?;
/// assert_eq!(tree.num_tips(), 4);
/// assert_eq!(tree.root().name(), Some("root"));
/// # Ok::<(), tree2tax::parser::ParsingError>(())
/// ```
pub struct NewickParser<T: TreeBuilder> {
    /// Allocation hint for the next tree, updated after every tree read
    num_vertices: usize,
    builder: T,
}

impl<T: TreeBuilder> NewickParser<T> {
    /// Creates a reader handing vertices to `builder`.
    pub fn new(builder: T) -> Self {
        NewickParser {
            num_vertices: DEFAULT_NUM_VERTICES_GUESS,
            builder,
        }
    }

    /// Sets how many vertices the first tree is expected to have.
    ///
    /// Later trees reuse the size of the tree read before them.
    pub fn with_num_vertices(mut self, num_vertices: usize) -> Self {
        self.num_vertices = num_vertices;
        self
    }

    /// Gives back the builder, e.g. to reuse it elsewhere.
    pub fn into_builder(self) -> T {
        self.builder
    }

    /// Reads every tree left in `source`.
    ///
    /// Only whitespace and `[...]` comments may separate the trees.
    pub fn parse_all<B: ByteSource>(&mut self, mut source: ByteParser<B>) -> Result<Vec<T::Tree>, ParsingError> {
        let mut trees = Vec::new();
        while self.has_more(&mut source)? {
            trees.push(self.parse_str(&mut source)?);
        }
        Ok(trees)
    }

    /// Reads one tree, up to and including its terminating `;`.
    ///
    /// # Errors
    /// [ParsingError] on malformed Newick, an unclosed quote or comment, or
    /// input ending before the tree does.
    pub fn parse_str<B: ByteSource>(&mut self, source: &mut ByteParser<B>) -> Result<T::Tree, ParsingError> {
        if !self.has_more(source)? {
            return Err(ParsingError::unexpected_eof(source));
        }

        self.builder.init_next(self.num_vertices);
        let mut seen = 1;
        let children = if source.peek_is(b'(') {
            self.parse_clade_children(source, &mut seen)?
        } else {
            Vec::new()
        };
        let suffix = self.parse_suffix(source)?;
        expect(source, b';', "the end of the tree")?;

        self.builder.add_root(&children, suffix.label, suffix.branch_length);
        self.num_vertices = seen;
        self.builder
            .finish_tree()
            .ok_or_else(|| ParsingError::unexpected_eof(source))
    }

    fn has_more<B: ByteSource>(&self, source: &mut ByteParser<B>) -> Result<bool, ParsingError> {
        source.skip_comment_and_whitespace()?;
        Ok(!source.is_eof())
    }

    /// Reads a tip or a whole clade below the root.
    fn parse_clade<B: ByteSource>(
        &mut self,
        source: &mut ByteParser<B>,
        seen: &mut usize,
    ) -> Result<T::VertexIdx, ParsingError> {
        source.skip_comment_and_whitespace()?;
        *seen += 1;

        if !source.peek_is(b'(') {
            let suffix = self.parse_suffix(source)?;
            return Ok(self.builder.add_tip(suffix.label, suffix.branch_length));
        }
        let children = self.parse_clade_children(source, seen)?;
        let suffix = self.parse_suffix(source)?;
        Ok(self.builder.add_internal(&children, suffix.label, suffix.branch_length))
    }

    /// Reads `(clade, clade, ...)`, a single clade being allowed.
    fn parse_clade_children<B: ByteSource>(
        &mut self,
        source: &mut ByteParser<B>,
        seen: &mut usize,
    ) -> Result<Vec<T::VertexIdx>, ParsingError> {
        expect(source, b'(', "the start of a clade")?;

        let mut children = vec![self.parse_clade(source, seen)?];
        source.skip_comment_and_whitespace()?;
        while source.consume_if(b',') {
            children.push(self.parse_clade(source, seen)?);
            source.skip_comment_and_whitespace()?;
        }
        expect(source, b')', "a ',' or the end of a clade")?;

        Ok(children)
    }

    /// Reads the optional label and optional `:length` after a vertex.
    fn parse_suffix<B: ByteSource>(&mut self, source: &mut ByteParser<B>) -> Result<VertexSuffix, ParsingError> {
        let label = source.parse_label(NEWICK_LABEL_DELIMITERS)?;
        let label = (!label.is_empty()).then_some(label);

        source.skip_comment_and_whitespace()?;
        let branch_length = if source.consume_if(b':') {
            source.skip_comment_and_whitespace()?;
            Some(parse_branch_length(source)?)
        } else {
            None
        };

        Ok(VertexSuffix { label, branch_length })
    }
}

/// Consumes `byte`, failing with a message naming what was `wanted`.
fn expect<B: ByteSource>(source: &mut ByteParser<B>, byte: u8, wanted: &str) -> Result<(), ParsingError> {
    source.skip_comment_and_whitespace()?;
    if source.consume_if(byte) {
        return Ok(());
    }
    match source.peek() {
        None => Err(ParsingError::unexpected_eof(source)),
        Some(found) => Err(ParsingError::invalid_newick_string(
            source,
            format!("Expected '{}' at {} but found '{}'", char::from(byte), wanted, char::from(found)),
        )),
    }
}

/// Reads a non-negative, finite number such as `0.02` or `1.5e-3`.
fn parse_branch_length<B: ByteSource>(source: &mut ByteParser<B>) -> Result<f64, ParsingError> {
    let mut token = String::new();
    while let Some(b) = source.peek().filter(|b| b.is_ascii_digit() || b"+-.eE".contains(b)) {
        token.push(char::from(b));
        source.next_byte();
    }

    match token.parse::<f64>() {
        Ok(length) if length >= 0.0 && length.is_finite() => Ok(length),
        Ok(length) => Err(ParsingError::invalid_newick_string(
            source,
            format!("Branch lengths must be non-negative and finite, got {}", length),
        )),
        Err(_) => Err(ParsingError::invalid_newick_string(
            source,
            format!("Cannot read branch length from {:?}", token),
        )),
    }
}
