//! Errors raised while reading a tree, located by byte offset.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::ByteSource;

/// Number of upcoming bytes quoted in an error message.
const CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================€=
/// What went wrong while reading a tree.
#[derive(PartialEq, Debug, Clone, thiserror::Error)]
pub enum ParsingErrorType {
    #[error("cannot read input: {0}")]
    IoError(String),
    #[error("input ended in the middle of a tree")]
    UnexpectedEOF,
    #[error("comment opened with '[' is never closed")]
    UnclosedComment,
    #[error("label opened with a single quote is never closed")]
    UnclosedQuote,
    #[error("malformed Newick: {0}")]
    InvalidNewickString(String),
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================$=
/// A [ParsingErrorType] together with where it happened and the input that
/// follows, e.g.
/// ```text
/// malformed Newick: Expected ')' at a ',' or the end of a clade but found ';' at position 8
///   followed by: ;
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{kind} at position {position}{}", context_note(.context))]
pub struct ParsingError {
    #[source]
    kind: ParsingErrorType,
    position: usize,
    context: String,
}

fn context_note(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!("\n  followed by: {}", context)
    }
}

impl ParsingError {
    /// Error of the given kind at the current position of `parser`.
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &ByteParser<S>) -> Self {
        ParsingError {
            kind,
            position: parser.position(),
            context: parser.get_context_as_string(CONTEXT_LENGTH),
        }
    }

    pub fn unexpected_eof<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    pub fn unclosed_comment<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedComment, parser)
    }

    pub fn unclosed_quote<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnclosedQuote, parser)
    }

    pub fn invalid_newick_string<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::InvalidNewickString(msg), parser)
    }

    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Byte offset into the input.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        ParsingError {
            kind: ParsingErrorType::IoError(err.to_string()),
            position: 0,
            context: String::new(),
        }
    }
}
