//! Read, edit and rewrite JSON, TOML, env and 7cfg files without losing
//! comments, ordering or formatting.
//!
//! ```text
//! let mut document = tinyconf::parse(text, Dialect::Toml)?;
//! document.editor().set(["server", "port"], 9090)?;
//! let text = tinyconf::render(&document);
//! ```

pub use tinyconf_errors::{
    CapabilityError, Diagnostic, DuplicateKeyError, EditError, InvalidPermutationError, LexError, Loss,
    LossyConversionWarning, ParseError, PathNotFoundError, PluginError, Position, Renderer, Severity, SyntaxError,
    TextRange, TextSize, TypeMismatchError,
};
pub use tinyconf_parse::{EnvOptions, ParseOptions, parse_bytes};
pub use tinyconf_plugin as plugin;
pub use tinyconf_render::{RenderOptions, Rendered, render_as};
pub use tinyconf_tree::{
    Array, ArrayStyle, Decor, Dialect, Document, Editor, Entry, Key, Node, NodeKind, Path, Scalar, ScalarValue,
    Segment, Syntax, Table, TableStyle, Value,
};

/// Parses `text` with default options.
pub fn parse(text: &str, dialect: Dialect) -> Result<Document, SyntaxError> {
    tinyconf_parse::parse(text, dialect, &ParseOptions::default())
}

pub fn parse_with(text: &str, dialect: Dialect, options: &ParseOptions) -> Result<Document, SyntaxError> {
    tinyconf_parse::parse(text, dialect, options)
}

/// Renders the document in its own dialect.
pub fn render(document: &Document) -> String {
    tinyconf_render::render(document, &RenderOptions::default())
}

/// Renders the document in another dialect, with the warnings of the
/// conversion.
pub fn convert(document: &Document, target: Dialect) -> Rendered {
    render_as(document, target, &RenderOptions::default())
}

/// Renders the document and parses the result again, giving a document
/// with nothing dirty whose source is the rendered text.
pub fn checkpoint(document: &Document, options: &ParseOptions) -> Result<Document, SyntaxError> {
    let text = render(document);
    let options = ParseOptions { seven_cfg: Some(document.syntax()), ..*options };
    tracing::debug!(dialect = %document.dialect(), len = text.len(), "checkpoint");
    tinyconf_parse::parse(&text, document.dialect(), &options)
}
