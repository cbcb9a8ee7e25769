//! Reading reference trees written in Newick.
//!
//! Most callers only need [`parse_file`] or [`parse_str`], which build a
//! [`PhyloTree`]. [`NewickParser`] works with any
//! [`TreeBuilder`](crate::model::TreeBuilder) and can read several trees from
//! one [`ByteParser`] with [`NewickParser::parse_all`].
//!
//! # Accepted syntax
//! ```text
//! tree   ::= clade ';'
//! clade  ::= '(' clade (',' clade)* ')' [label] [':' length]
//!          | label [':' length]
//! ```
//! * Blanks and `[...]` comments may appear between any two tokens.
//! * A label containing Newick punctuation or blanks, such as
//!   `'g__Halo; s__fu'`, is single-quoted; `''` inside stands for `'`.
//! * Lengths may use exponents (`2e-3`) and must not be negative.
//! * Vertices may have a single child, and any number of children.
//!
//! Internal labels carry the annotation this crate works with, such as
//! `'f__family'`, a bootstrap value like `95`, or both as `'95:f__family'`.

mod defs;
mod parser;

pub use self::parser::NewickParser;

use crate::model::{PhyloTree, PhyloTreeBuilder};
use crate::parser::ByteParser;
use crate::parser::ParsingError;
use std::path::Path;
use tracing::warn;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses the first Newick tree of a file into a [`PhyloTree`].
///
/// Trailing trees are ignored with a warning, since a run works on a single
/// reference tree.
///
/// # Errors
/// [`ParsingError`] if the file cannot be read or its first tree is malformed.
///
/// # Example
/// ```ignore
/// use tree2tax::newick::parse_file;
///
/// let tree = parse_file("reference.tree")?;
/// println!("Parsed tree with {} tips", tree.num_tips());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<PhyloTree, ParsingError> {
    let mut byte_parser = ByteParser::for_file(path)?;
    let mut newick_parser = NewickParser::new(PhyloTreeBuilder::new());
    let tree = newick_parser.parse_str(&mut byte_parser)?;

    byte_parser.skip_comment_and_whitespace()?;
    if !byte_parser.is_eof() {
        warn!(
            "Found more than one tree in file, ignoring everything after position {}",
            byte_parser.position()
        );
    }
    Ok(tree)
}

/// Parses a single Newick string to obtain a [`PhyloTree`].
///
/// # Example
/// ```
/// use tree2tax::newick::parse_str;
///
/// let tree = parse_str("((A:0.11,B:0.12)C:0.1,D:0.2)root;")?;
/// assert_eq!(tree.num_tips(), 3);
/// # Ok::<(), tree2tax::parser::ParsingError>(())
/// ```
pub fn parse_str<S: AsRef<str>>(newick: S) -> Result<PhyloTree, ParsingError> {
    let mut newick_parser = NewickParser::new(PhyloTreeBuilder::new());
    let mut byte_parser = ByteParser::for_str(newick.as_ref());
    newick_parser.parse_str(&mut byte_parser)
}
