//! Serializers: a document back to its own dialect with every untouched
//! byte preserved, or converted to another dialect.

mod env;
mod json;
mod printer;
mod scalar;
mod toml;

#[cfg(test)]
mod tests;

use tinyconf_errors::LossyConversionWarning;
use tinyconf_syntax::{Dialect, Syntax};
use tinyconf_tree::Document;

use crate::printer::Printer;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderOptions {
    /// Spaces per nesting level for freshly laid out JSON.
    pub indent: usize,
    /// Inner syntax when writing a 7cfg file. Defaults to the syntax of the
    /// document.
    pub seven_cfg: Option<Syntax>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { indent: 2, seven_cfg: None }
    }
}

/// Output of a conversion, with what could not be carried over.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub warnings: Vec<LossyConversionWarning>,
}

/// Renders the document in the dialect it was parsed as.
pub fn render(document: &Document, options: &RenderOptions) -> String {
    render_as(document, document.dialect(), options).text
}

/// Renders the document in `target`. Within one syntax, clean nodes are
/// copied from the source; across syntaxes, the output is laid out fresh
/// and every loss is reported as a warning.
pub fn render_as(document: &Document, target: Dialect, options: &RenderOptions) -> Rendered {
    let (syntax, tag) = match target.syntax() {
        Some(syntax) => (syntax, None),
        None => {
            let syntax = options.seven_cfg.unwrap_or(document.syntax());
            let tag = if document.dialect() == Dialect::SevenCfg && syntax == document.syntax() {
                document.tag().map(str::to_string)
            } else {
                Some(format!("#!7cfg {syntax}\n"))
            };
            (syntax, tag)
        }
    };
    tracing::debug!(from = %document.dialect(), to = %target, %syntax, "rendering");

    let source = document.source();
    let body = &source[document.tag().map_or(0, str::len)..];
    if syntax == document.syntax() && document.root().is_clean() {
        let text = format!("{}{body}", tag.unwrap_or_default());
        return Rendered { text, warnings: Vec::new() };
    }

    let mut p = Printer::new(source, options, document.syntax(), syntax);
    if let Some(tag) = &tag {
        p.push(tag);
    }
    match syntax {
        Syntax::Json => json::document(&mut p, document.root()),
        Syntax::Toml => toml::document(&mut p, document.root()),
        Syntax::Env => env::document(&mut p, document.root()),
    }
    Rendered { text: p.out, warnings: p.warnings }
}
