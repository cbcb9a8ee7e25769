//! Where [ByteParser](crate::parser::ByteParser) gets its bytes from.
//!
//! Reference trees are small enough to hold in memory, so
//! [InMemoryByteSource](crate::parser::in_memory_byte_source::InMemoryByteSource)
//! is the only source shipped.

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================T=
/// Forward-only stream of bytes with one byte of lookahead.
pub trait ByteSource {
    /// Byte under the cursor, `None` once exhausted.
    fn peek(&self) -> Option<u8>;

    /// Byte under the cursor, advancing past it.
    fn next_byte(&mut self) -> Option<u8>;

    /// Up to `k` bytes starting at the cursor, used to quote input in errors.
    fn get_context(&self, k: usize) -> &[u8];

    /// Bytes consumed so far.
    fn position(&self) -> usize;

    /// Whether no bytes are left.
    fn is_eof(&self) -> bool {
        self.peek().is_none()
    }
}
