//! Cursor over the parse buffer
//!
//! Classification goes through the byte table; multi-byte delimiters
//! (`?>`, `--`, `]]`) are located with memchr, which uses SIMD when available.

use memchr::{memchr, memmem};

use super::entities::{expand_in_place, Expanded};
use super::tables::{is, CharClass};

/// Scanner for the mutable input buffer
pub struct Scanner<'a> {
    input: &'a mut [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner starting at `pos`
    #[inline]
    pub fn new(input: &'a mut [u8], pos: usize) -> Self {
        Scanner { input, pos }
    }

    /// Get the current position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the current position
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Check if we've reached the end
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The whole buffer
    #[inline]
    pub fn input(&self) -> &[u8] {
        &*self.input
    }

    /// Get remaining bytes
    #[inline]
    pub fn remaining(&self) -> &[u8] {
        &self.input[self.pos.min(self.input.len())..]
    }

    /// Peek at current byte without advancing
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Peek at byte at offset from current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    /// Advance by n bytes
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    /// Skip bytes belonging to `class`, returning how many were skipped
    #[inline]
    pub fn skip(&mut self, class: CharClass) -> usize {
        let start = self.pos;
        while self.pos < self.input.len() && is(self.input[self.pos], class) {
            self.pos += 1;
        }
        self.pos - start
    }

    /// Skip whitespace characters (space, tab, newline, carriage return)
    #[inline]
    pub fn skip_whitespace(&mut self) -> usize {
        self.skip(CharClass::WHITESPACE)
    }

    /// Check if input starts with a byte sequence at current position
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.remaining().starts_with(needle)
    }

    /// Find the next occurrence of `needle` at or after the current position
    #[inline]
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.remaining(), needle).map(|i| self.pos + i)
    }

    /// Find next occurrence of a specific byte
    #[inline]
    pub fn find_byte(&self, byte: u8) -> Option<usize> {
        memchr(byte, self.remaining()).map(|i| self.pos + i)
    }

    /// Decode the run at the current position in place and move to its sentinel
    #[inline]
    pub fn expand(&mut self, class: CharClass, pure: CharClass) -> Option<Expanded> {
        let expanded = expand_in_place(&mut *self.input, self.pos, class, pure)?;
        self.pos = expanded.stop;
        Some(expanded)
    }
}
