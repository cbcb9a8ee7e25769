//! [ByteSource] over an owned buffer.

use crate::parser::byte_source::ByteSource;
use std::path::Path;

// =#========================================================================#=
// IN MEMORY BYTE SOURCE
// =#========================================================================$=
/// Whole input held in a `Vec<u8>`, read with a moving cursor.
pub struct InMemoryByteSource {
    bytes: Vec<u8>,
    cursor: usize,
}

impl InMemoryByteSource {
    /// Takes ownership of `bytes`, with the cursor at the start.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        InMemoryByteSource { bytes, cursor: 0 }
    }

    /// Reads the file at `path` completely.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        std::fs::read(path).map(Self::from_vec)
    }

    fn remaining(&self) -> &[u8] {
        self.bytes.get(self.cursor..).unwrap_or_default()
    }
}

impl ByteSource for InMemoryByteSource {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.remaining().first().copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek();
        if byte.is_some() {
            self.cursor += 1;
        }
        byte
    }

    fn get_context(&self, k: usize) -> &[u8] {
        let remaining = self.remaining();
        &remaining[..k.min(remaining.len())]
    }

    #[inline]
    fn position(&self) -> usize {
        self.cursor
    }
}
