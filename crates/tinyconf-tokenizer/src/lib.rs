//! The lexeme stream: turns a source buffer of one syntax into tokens.
//!
//! Every byte of the input ends up either inside a token's range or inside
//! the leading trivia of the token that follows it; the final `EOF` token
//! carries whatever trivia is left at the end of the buffer.

mod cursor;
mod env;
mod json;
mod strings;
mod toml;

use cursor::Cursor;
use text_size::{TextRange, TextSize};
use tinyconf_errors::{LexError, Position};
pub use tinyconf_syntax::{Syntax, SyntaxKind, TriviaPiece, TriviaPieceKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub leading: Vec<TriviaPiece>,
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn leading_len(&self) -> TextSize {
        self.leading.iter().map(|piece| piece.len).sum()
    }

    /// The token range extended backwards over its leading trivia.
    pub fn full_range(&self) -> TextRange {
        TextRange::new(self.range.start() - self.leading_len(), self.range.end())
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range]
    }

    pub fn has_comment(&self) -> bool {
        self.leading.iter().any(|piece| piece.kind == TriviaPieceKind::Comment)
    }
}

/// TOML and env decide what a run of characters means from context: `1234`
/// is a key on the left of `=` and an integer on the right.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LexMode {
    Key,
    Value,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    text: &'a str,
    syntax: Syntax,
    cursor: Cursor<'a>,
    mode: LexMode,
    finished: bool,
}

/// Validates that `bytes` is UTF-8, reporting the first offending byte.
pub fn decode(bytes: &[u8]) -> Result<&str, LexError> {
    std::str::from_utf8(bytes).map_err(|error| {
        let valid = error.valid_up_to();
        // The prefix is valid by construction, so this cannot fail.
        let prefix = std::str::from_utf8(&bytes[..valid]).unwrap_or_default();
        LexError {
            position: Position::locate(prefix, TextSize::new(valid as u32)),
            expected: "valid UTF-8".to_string(),
        }
    })
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str, syntax: Syntax) -> Self {
        Self { text, syntax, cursor: Cursor::new(text), mode: LexMode::Key, finished: false }
    }

    /// A lexer over `text` that begins at `offset` (on a char boundary).
    /// Ranges stay relative to the start of `text`.
    pub fn starting_at(text: &'a str, syntax: Syntax, offset: TextSize) -> Self {
        let mut lexer = Self::new(text, syntax);
        lexer.restart_at(offset);
        lexer
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn mode(&self) -> LexMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LexMode) {
        self.mode = mode;
    }

    pub fn offset(&self) -> TextSize {
        self.cursor.offset()
    }

    pub fn restart_at(&mut self, offset: TextSize) {
        self.cursor.reset_to(offset);
        self.finished = false;
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        let mut leading = Vec::new();
        self.trivia(&mut leading);

        let start = self.cursor.offset();
        let kind = if self.cursor.is_eof() {
            SyntaxKind::EOF
        } else {
            match self.syntax {
                Syntax::Json => self.json_token()?,
                Syntax::Toml => self.toml_token()?,
                Syntax::Env => self.env_token()?,
            }
        };

        let range = TextRange::new(start, self.cursor.offset());
        tracing::trace!(?kind, ?range, "token");
        Ok(Token { leading, kind, range })
    }

    fn trivia(&mut self, pieces: &mut Vec<TriviaPiece>) {
        let line_based = self.syntax.is_line_based();

        while !self.cursor.is_eof() {
            let start = self.cursor.offset();
            let kind = match self.cursor.peek() {
                ' ' | '\t' => {
                    self.cursor.advance_while(|c| matches!(c, ' ' | '\t'));
                    TriviaPieceKind::Whitespace
                }
                '\u{feff}' if start == TextSize::new(0) => {
                    self.cursor.advance();
                    TriviaPieceKind::Whitespace
                }
                '\n' if !line_based => {
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                '\r' if self.cursor.second() == '\n' => {
                    if line_based {
                        break;
                    }
                    self.cursor.advance_by(2);
                    TriviaPieceKind::Newline
                }
                '\r' => {
                    self.cursor.advance();
                    TriviaPieceKind::Whitespace
                }
                '#' if self.comment_allowed() => {
                    self.skip_to_line_end();
                    TriviaPieceKind::Comment
                }
                _ => break,
            };

            pieces.push(TriviaPiece::new(kind, self.cursor.offset() - start));
        }
    }

    fn comment_allowed(&self) -> bool {
        match self.syntax {
            Syntax::Json => false,
            Syntax::Toml => true,
            // `KEY=#x` assigns `#x`; only a `#` after whitespace starts a comment.
            Syntax::Env => {
                self.mode == LexMode::Key || matches!(self.cursor.previous(), ' ' | '\t')
            }
        }
    }

    fn skip_to_line_end(&mut self) {
        while !self.cursor.is_eof() && !self.at_newline() {
            self.cursor.advance();
        }
    }

    fn at_newline(&self) -> bool {
        self.cursor.peek() == '\n' || self.cursor.starts_with("\r\n")
    }

    /// Consumes a `\n` or `\r\n` and reports whether there was one.
    fn eat_newline(&mut self) -> bool {
        if self.cursor.starts_with("\r\n") {
            self.cursor.advance_by(2);
            true
        } else {
            self.cursor.eat('\n')
        }
    }

    fn slice_from(&self, start: TextSize) -> &'a str {
        &self.text[TextRange::new(start, self.cursor.offset())]
    }

    fn error(&self, offset: TextSize, expected: impl Into<String>) -> LexError {
        LexError { position: Position::locate(self.text, offset), expected: expected.into() }
    }

    fn error_here(&self, expected: impl Into<String>) -> LexError {
        self.error(self.cursor.offset(), expected)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let token = self.next_token();
        if !matches!(&token, Ok(token) if token.kind != SyntaxKind::EOF) {
            self.finished = true;
        }
        Some(token)
    }
}
