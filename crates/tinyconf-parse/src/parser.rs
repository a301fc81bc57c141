use drop_bomb::DropBomb;
use text_size::{TextRange, TextSize};
use tinyconf_errors::{LexError, ParseError, Position, SyntaxError};
use tinyconf_syntax::{SyntaxKind, SyntaxSet};
use tinyconf_tokenizer::{LexMode, Lexer, Syntax, Token};

/// Recursive-descent driver shared by every grammar.
///
/// Tokens are lexed lazily, one at a time, so a grammar can switch the
/// lexing mode before the next token is looked at.
pub(crate) struct Parser<'t> {
    text: &'t str,
    lexer: Lexer<'t>,
    current: Option<Token>,
    last_end: TextSize,
    sections: u32,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(text: &'t str, syntax: Syntax, start: TextSize) -> Self {
        Self { text, lexer: Lexer::starting_at(text, syntax, start), current: None, last_end: start, sections: 0 }
    }

    pub(crate) fn peek(&mut self) -> Result<&Token, SyntaxError> {
        let token = match self.current.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        let token: &Token = self.current.insert(token);
        Ok(token)
    }

    pub(crate) fn peek_kind(&mut self) -> Result<SyntaxKind, SyntaxError> {
        Ok(self.peek()?.kind)
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> Result<bool, SyntaxError> {
        Ok(self.peek_kind()? == kind)
    }

    pub(crate) fn at_any(&mut self, set: SyntaxSet) -> Result<bool, SyntaxError> {
        Ok(set.contains(self.peek_kind()?))
    }

    pub(crate) fn bump(&mut self) -> Result<Token, SyntaxError> {
        let token = match self.current.take() {
            Some(token) => token,
            None => self.lexer.next_token()?,
        };
        self.last_end = token.range.end();
        Ok(token)
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> Result<Token, SyntaxError> {
        if self.at(kind)? { self.bump() } else { Err(self.unexpected(kind.describe())) }
    }

    pub(crate) fn expect_any(&mut self, set: SyntaxSet) -> Result<Token, SyntaxError> {
        if self.at_any(set)? { self.bump() } else { Err(self.unexpected(set.describe())) }
    }

    /// Switches the lexing mode, re-lexing a token that was already peeked.
    pub(crate) fn set_mode(&mut self, mode: LexMode) {
        if self.lexer.mode() == mode {
            return;
        }
        if let Some(token) = self.current.take() {
            self.lexer.restart_at(token.full_range().start());
        }
        self.lexer.set_mode(mode);
    }

    /// An error describing the current token, or the lexer's own error if
    /// the current token cannot be lexed.
    pub(crate) fn unexpected(&mut self, expected: impl Into<String>) -> SyntaxError {
        let expected = expected.into();
        let text = self.text;
        let (start, found) = match self.peek() {
            Ok(token) => (token.range.start(), describe(token, text)),
            Err(error) => return error,
        };
        ParseError { position: self.position(start), expected, found }.into()
    }

    pub(crate) fn lex_error(&self, offset: TextSize, expected: impl Into<String>) -> SyntaxError {
        LexError { position: self.position(offset), expected: expected.into() }.into()
    }

    pub(crate) fn position(&self, offset: TextSize) -> Position {
        Position::locate(self.text, offset)
    }

    pub(crate) fn text(&self) -> &'t str {
        self.text
    }

    pub(crate) fn slice(&self, range: TextRange) -> &'t str {
        &self.text[range]
    }

    /// The source text from `start` up to (not including) `end`.
    pub(crate) fn between(&self, start: TextSize, end: TextSize) -> &'t str {
        &self.text[TextRange::new(start, end)]
    }

    /// End of the last token consumed.
    pub(crate) fn last_end(&self) -> TextSize {
        self.last_end
    }

    pub(crate) fn next_section(&mut self) -> u32 {
        self.sections += 1;
        self.sections - 1
    }

    pub(crate) fn start(&mut self) -> Result<Marker, SyntaxError> {
        let start = self.peek()?.range.start();
        Ok(Marker::new(start))
    }

    /// Runs `f` and returns its result together with the range of the tokens
    /// it consumed.
    pub(crate) fn node<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<(T, TextRange), SyntaxError> {
        let marker = self.start()?;
        match f(self) {
            Ok(value) => Ok((value, marker.complete(self))),
            Err(error) => {
                marker.abandon();
                Err(error)
            }
        }
    }
}

fn describe(token: &Token, text: &str) -> String {
    let name = token.kind.describe();
    match token.kind {
        SyntaxKind::EOF | SyntaxKind::NEWLINE => name.to_string(),
        // Punctuation and keywords already name their text.
        _ if name.starts_with('`') => name.to_string(),
        _ => format!("{name} `{}`", token.text(text)),
    }
}

pub(crate) struct Marker {
    start: TextSize,
    bomb: DropBomb,
}

impl Marker {
    fn new(start: TextSize) -> Self {
        Self { start, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub(crate) fn complete(mut self, p: &Parser<'_>) -> TextRange {
        self.bomb.defuse();
        TextRange::new(self.start, p.last_end.max(self.start))
    }

    pub(crate) fn abandon(mut self) {
        self.bomb.defuse();
    }
}
