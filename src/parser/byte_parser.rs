//! Cursor over the bytes of a tree file.
//!
//! [ByteParser] knows the lexical rules shared by everything in a Newick file:
//! blanks, bracketed comments, and labels that are either bare or single-quoted.
//! Grammar lives in [newick](crate::newick).

use crate::parser::byte_source::ByteSource;
use crate::parser::in_memory_byte_source::InMemoryByteSource;
use crate::parser::parsing_error::ParsingError;
use std::path::Path;

const QUOTE: u8 = b'\'';
const COMMENT_OPEN: u8 = b'[';
const COMMENT_CLOSE: u8 = b']';

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// Byte cursor with lookahead of one, plus comment and label handling.
///
/// Input is treated as ASCII; bytes of quoted labels are taken as they are
/// and decoded as UTF-8 at the end, so annotations such as `'s__Halo µ'`
/// survive.
///
/// # Example
/// ```
/// use tree2tax::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  [comment] 'g__Halo; s__fu':0.5");
/// parser.skip_comment_and_whitespace()?;
/// let label = parser.parse_label(b":,);")?;
/// assert_eq!(label, "g__Halo; s__fu");
/// assert!(parser.consume_if(b':'));
/// # Ok::<(), tree2tax::parser::ParsingError>(())
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

impl ByteParser<InMemoryByteSource> {
    /// Copies `input` into a new parser.
    pub fn for_str(input: &str) -> Self {
        Self::new(InMemoryByteSource::from_vec(input.into()))
    }

    /// Loads the whole file at `path` into a new parser.
    ///
    /// # Errors
    /// [ParsingError] of kind `IoError` if the file cannot be read.
    pub fn for_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let source = InMemoryByteSource::from_file(path)?;
        Ok(Self::new(source))
    }
}

// ============================================================================
// Cursor (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Wraps any [ByteSource].
    pub fn new(source: S) -> Self {
        ByteParser { source }
    }

    /// Current byte, `None` at the end of input.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Current byte, moving past it.
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Whether the current byte is `ch`.
    pub fn peek_is(&self, ch: u8) -> bool {
        self.source.peek() == Some(ch)
    }

    /// Moves past the current byte only if it is `ch`, reporting whether it did.
    pub fn consume_if(&mut self, ch: u8) -> bool {
        let matched = self.peek_is(ch);
        if matched {
            self.source.next_byte();
        }
        matched
    }

    /// Moves past the next occurrence of `target`.
    ///
    /// # Returns
    /// `false` if input ran out before `target` showed up
    pub fn consume_until_inclusive(&mut self, target: u8) -> bool {
        std::iter::from_fn(|| self.source.next_byte()).any(|b| b == target)
    }

    /// Whether all input has been consumed.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Up to `k` upcoming bytes, lossily decoded, for error messages.
    pub fn get_context_as_string(&self, k: usize) -> String {
        String::from_utf8_lossy(self.source.get_context(k)).into_owned()
    }
}

// ============================================================================
// Blanks and comments (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Moves past spaces, tabs and line breaks.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r')) {
            self.source.next_byte();
        }
    }

    /// Moves past one `[...]` comment if the cursor is on one.
    ///
    /// # Returns
    /// Whether a comment was skipped.
    ///
    /// # Errors
    /// [ParsingError] of kind `UnclosedComment` if `]` never comes.
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if !self.consume_if(COMMENT_OPEN) {
            return Ok(false);
        }
        if self.consume_until_inclusive(COMMENT_CLOSE) {
            Ok(true)
        } else {
            Err(ParsingError::unclosed_comment(self))
        }
    }

    /// Moves past any mix of blanks and comments.
    ///
    /// # Errors
    /// See [skip_comment](Self::skip_comment).
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        loop {
            self.skip_whitespace();
            if !self.skip_comment()? {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// Labels (pub)
// ============================================================================
impl<S: ByteSource> ByteParser<S> {
    /// Reads a label after skipping blanks and comments. A label starting
    /// with `'` is read as quoted, any other up to one of `delimiters`.
    ///
    /// An empty string means there was no label.
    ///
    /// # Errors
    /// [ParsingError] of kind `UnclosedQuote` for a quote that is never closed.
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;
        match self.peek() {
            Some(QUOTE) => self.parse_quoted_label(),
            _ => Ok(self.parse_unquoted_label(delimiters)),
        }
    }

    /// Reads `'...'` with the cursor on the opening quote; `''` inside stands
    /// for a single quote, e.g. `'Wilson''s'` reads as `Wilson's`.
    ///
    /// # Errors
    /// [ParsingError] of kind `UnclosedQuote` if input ends inside the label.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        self.consume_if(QUOTE);

        let mut bytes = Vec::new();
        loop {
            match self.source.next_byte() {
                None => return Err(ParsingError::unclosed_quote(self)),
                Some(QUOTE) if self.consume_if(QUOTE) => bytes.push(QUOTE),
                Some(QUOTE) => break,
                Some(b) => bytes.push(b),
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Reads bytes up to (not including) the first of `delimiters`, or to
    /// the end of input.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> String {
        let mut bytes = Vec::new();
        while let Some(b) = self.peek().filter(|b| !delimiters.contains(b)) {
            bytes.push(b);
            self.source.next_byte();
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
