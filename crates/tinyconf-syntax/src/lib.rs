//! Shared syntax vocabulary: dialects, token kinds and trivia pieces.
//!
//! Every other crate in the workspace speaks in these types, so they carry no
//! behavior beyond classification.

mod dialect;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Dialect selectors and the concrete grammars they resolve to.
pub use dialect::{Dialect, Syntax, UnknownDialect};
/// Token kinds produced by the tokenizer.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
