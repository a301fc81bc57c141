//! The Config Tree: one ordered, trivia-carrying representation shared by
//! every dialect, and the editor that is its only writer.

mod document;
mod edit;
mod node;
mod path;
mod value;

pub use document::Document;
pub use edit::Editor;
pub use node::{Array, ArrayStyle, Decor, Entry, Key, Node, NodeKind, Scalar, ScalarValue, Table, TableStyle};
pub use path::{ParsePathError, Path, Segment};
pub use tinyconf_syntax::{Dialect, Syntax};
pub use value::Value;

/// Whether `key` can be written without quotes in TOML, and in paths.
pub fn is_bare_key(key: &str) -> bool {
    path::is_bare_key(key)
}
