//! Trivia pieces: the non-semantic text between tokens.

use text_size::TextSize;

/// Kinds of trivia a tokenizer can produce.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TriviaPieceKind {
    /// Spaces and tabs.
    Whitespace,
    /// `\n` or `\r\n`. Only trivia in grammars where lines carry no meaning.
    Newline,
    /// A line comment, from its prefix up to (not including) the line break.
    Comment,
}

/// A trivia fragment with its kind and length.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TriviaPiece {
    pub kind: TriviaPieceKind,
    pub len: TextSize,
}

impl TriviaPiece {
    /// Creates a new trivia piece with the given kind and length.
    pub fn new(kind: TriviaPieceKind, len: TextSize) -> Self {
        Self { kind, len }
    }

    /// Splits a run of trivia text into pieces.
    ///
    /// `text` must consist only of whitespace, line breaks and (when
    /// `comment_prefix` is set) line comments; anything else is folded into
    /// the surrounding comment or whitespace piece.
    pub fn split(text: &str, comment_prefix: Option<char>) -> Vec<Self> {
        let mut pieces = Vec::new();
        let mut rest = text;

        while let Some(first) = rest.chars().next() {
            let (kind, len) = if Some(first) == comment_prefix {
                (TriviaPieceKind::Comment, rest.find(['\r', '\n']).unwrap_or(rest.len()))
            } else if first == '\n' {
                (TriviaPieceKind::Newline, 1)
            } else if rest.starts_with("\r\n") {
                (TriviaPieceKind::Newline, 2)
            } else {
                let len = rest
                    .char_indices()
                    .skip(1)
                    .find(|&(at, c)| {
                        c == '\n' || rest[at..].starts_with("\r\n") || Some(c) == comment_prefix
                    })
                    .map_or(rest.len(), |(at, _)| at);
                (TriviaPieceKind::Whitespace, len)
            };

            pieces.push(Self::new(kind, TextSize::new(len as u32)));
            rest = &rest[len..];
        }

        pieces
    }
}
