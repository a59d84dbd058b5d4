//! # Cursor
//!
//! Byte-by-byte navigation through the source buffer with line/column
//! tracking. The compiled language is ASCII-only (aside from raw bytes
//! inside string literals), so the cursor operates on a byte slice rather
//! than `Vec<char>` — this avoids the per-source allocation
//! `.chars().collect()` would require.

use crate::error::Span;

pub struct Cursor<'a> {
    source: &'a str,
    bytes: &'a [u8],
    /// Current byte offset (also the index into `bytes`).
    pos: usize,
    /// Current line number (1-indexed).
    line: usize,
    /// Current column number (1-indexed).
    col: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, bytes: source.as_bytes(), pos: 0, line: 1, col: 1 }
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// The remainder of the source starting at the cursor, used for
    /// longest-prefix keyword/punctuator matching.
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn advance(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    /// Advance past exactly `n` bytes (used once a multi-byte lexeme's
    /// length is already known, e.g. a matched keyword or punctuator).
    pub fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn byte_pos(&self) -> usize {
        self.pos
    }

    /// `(byte offset, line, col)` of the current cursor position.
    pub fn current_pos(&self) -> (usize, usize, usize) {
        (self.pos, self.line, self.col)
    }

    /// Build a `Span` running from the given start position to the cursor's
    /// current position.
    pub fn make_span(&self, start: (usize, usize, usize)) -> Span {
        let (sb, sl, sc) = start;
        Span::new(sb, self.pos, sl, sc)
    }
}
