//! Character scanner.
use std::{iter::Peekable, str::CharIndices};

/// Character returned by the cursor once the source is exhausted.
pub const EOF_CHAR: char = '\0';

/// Walks the source one character at a time, keeping track
/// of byte offsets and line numbers.
pub struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    /// Byte offset and value of the current character.
    current: (u32, char),
    /// Line of the current character, counting from 1.
    line: u32,
    /// Size of the source in bytes.
    len: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            current: (0, EOF_CHAR),
            line: 1,
            len: source.len() as u32,
        }
    }

    /// Advance to the next character and return it.
    ///
    /// Returns [`EOF_CHAR`] once the end of the source is reached.
    pub fn next(&mut self) -> char {
        if self.current.1 == '\n' {
            self.line += 1;
        }

        match self.chars.next() {
            Some((index, c)) => {
                self.current = (index as u32, c);
                c
            }
            None => {
                self.current = (self.len, EOF_CHAR);
                EOF_CHAR
            }
        }
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current.1
    }

    /// Look at the character after the current one without advancing.
    #[inline]
    pub fn peek(&mut self) -> char {
        self.chars.peek().map(|(_, c)| *c).unwrap_or(EOF_CHAR)
    }

    /// Byte offset of the current character.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.current.0
    }

    /// Byte offset of the character after the current one.
    #[inline]
    pub fn peek_offset(&mut self) -> u32 {
        let len = self.len;
        self.chars.peek().map(|(i, _)| *i as u32).unwrap_or(len)
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Indicates whether the cursor has moved past the last character.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.current.0 >= self.len
    }
}
