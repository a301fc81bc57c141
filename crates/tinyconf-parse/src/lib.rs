//! Fidelity-preserving parsers for JSON, TOML, env and 7cfg.
//!
//! Every parser produces a [`Document`] whose tree keeps the exact source
//! text of each value and the trivia around it, so that rendering an
//! unmodified document reproduces the input byte for byte.

mod grammar;
mod parser;
mod scalars;
mod seven_cfg;

#[cfg(test)]
mod tests;

use text_size::TextSize;
use tinyconf_errors::SyntaxError;
use tinyconf_tokenizer::Syntax;
use tinyconf_tree::{Dialect, Document};

use crate::parser::Parser;

/// Options of the env grammar.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EnvOptions {
    /// Read unquoted `true`, `false` and numbers as typed scalars instead of
    /// strings.
    pub infer_scalars: bool,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseOptions {
    /// Inner syntax of 7cfg input, overriding the tag line and sniffing.
    pub seven_cfg: Option<Syntax>,
    pub env: EnvOptions,
}

pub fn parse(text: &str, dialect: Dialect, options: &ParseOptions) -> Result<Document, SyntaxError> {
    let (tag, syntax) = match dialect.syntax() {
        Some(syntax) => (None, syntax),
        None => seven_cfg::resolve(text, options.seven_cfg)?,
    };
    tracing::debug!(%dialect, %syntax, len = text.len(), "parsing");

    let start = TextSize::of(tag.unwrap_or_default());
    let mut p = Parser::new(text, syntax, start);
    let root = match syntax {
        Syntax::Json => grammar::json::document(&mut p)?,
        Syntax::Toml => grammar::toml::document(&mut p)?,
        Syntax::Env => grammar::env::document(&mut p, &options.env)?,
    };

    Ok(Document::new(text.to_string(), dialect, syntax, tag.map(str::to_string), root))
}

/// Like [`parse`], for input that has not been checked to be UTF-8 yet.
pub fn parse_bytes(bytes: &[u8], dialect: Dialect, options: &ParseOptions) -> Result<Document, SyntaxError> {
    let text = tinyconf_tokenizer::decode(bytes)?;
    parse(text, dialect, options)
}
