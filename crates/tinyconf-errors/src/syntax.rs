use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::{Diagnostic, Position};

/// The input contains bytes that cannot begin any token of the dialect.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{position}: expected {expected}")]
pub struct LexError {
    pub position: Position,
    pub expected: String,
}

/// The token stream does not match the dialect grammar.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("{position}: expected {expected}, found {found}")]
pub struct ParseError {
    pub position: Position,
    pub expected: String,
    pub found: String,
}

/// A key occurs twice in one table.
///
/// Raised by parsers (with the position of the second occurrence) and by
/// `insert` (without a position).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("duplicate key `{key}`{}", at(.position))]
pub struct DuplicateKeyError {
    pub key: String,
    pub position: Option<Position>,
}

fn at(position: &Option<Position>) -> String {
    position.map(|position| format!(" at {position}")).unwrap_or_default()
}

/// Every way turning bytes into a tree can fail. A failed parse yields no
/// tree at all.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    DuplicateKey(#[from] DuplicateKeyError),
}

impl SyntaxError {
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Lex(error) => Some(error.position),
            Self::Parse(error) => Some(error.position),
            Self::DuplicateKey(error) => error.position,
        }
    }

    /// A single-byte diagnostic at the error position.
    pub fn diagnostic(&self) -> Diagnostic {
        let start = self.position().map_or(TextSize::new(0), |position| position.offset);
        let message = match self {
            Self::Lex(error) => format!("expected {}", error.expected),
            Self::Parse(error) => format!("expected {}, found {}", error.expected, error.found),
            Self::DuplicateKey(error) => format!("duplicate key `{}`", error.key),
        };
        Diagnostic::error(message, TextRange::at(start, TextSize::new(1)))
    }
}
