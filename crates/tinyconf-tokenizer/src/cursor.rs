use std::str::Chars;

use text_size::{TextLen, TextSize};

pub(crate) const EOF_CHAR: char = '\0';

#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    chars: Chars<'a>,
    previous: char,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, chars: text.chars(), previous: EOF_CHAR }
    }

    /// Byte offset of the next character.
    pub(crate) fn offset(&self) -> TextSize {
        self.text.text_len() - TextSize::of(self.chars.as_str())
    }

    /// Moves the cursor to `offset`, which must lie on a char boundary.
    pub(crate) fn reset_to(&mut self, offset: TextSize) {
        let offset = usize::from(offset);
        self.chars = self.text[offset..].chars();
        self.previous = self.text[..offset].chars().next_back().unwrap_or(EOF_CHAR);
    }

    pub(crate) fn rest(&self) -> &'a str {
        self.chars.as_str()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    pub(crate) fn previous(&self) -> char {
        self.previous
    }

    pub(crate) fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF_CHAR)
    }

    pub(crate) fn starts_with(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    pub(crate) fn advance(&mut self) -> char {
        self.previous = self.chars.next().unwrap_or(EOF_CHAR);
        self.previous
    }

    pub(crate) fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    pub(crate) fn eat(&mut self, c: char) -> bool {
        if !self.is_eof() && self.peek() == c {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while !self.is_eof() && f(self.peek()) {
            self.advance();
        }
    }
}
