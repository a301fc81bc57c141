//! The 7cfg container: a file in one of the other syntaxes, optionally
//! announcing which one on a `#!7cfg <syntax>` first line.

use text_size::TextSize;
use tinyconf_errors::{ParseError, Position, SyntaxError};
use tinyconf_tokenizer::Syntax;

const TAG: &str = "#!7cfg";

/// The tag line, terminator included, if the text starts with one.
pub(crate) fn tag_line(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(TAG)?;
    if !(rest.is_empty() || rest.starts_with([' ', '\t', '\r', '\n'])) {
        return None;
    }
    let len = text.find('\n').map_or(text.len(), |newline| newline + 1);
    Some(&text[..len])
}

/// Decides the inner syntax. An explicit choice wins over the tag, and the
/// tag wins over sniffing the content.
pub(crate) fn resolve(text: &str, choice: Option<Syntax>) -> Result<(Option<&str>, Syntax), SyntaxError> {
    let tag = tag_line(text);
    if let Some(syntax) = choice {
        return Ok((tag, syntax));
    }

    let body = &text[tag.map_or(0, str::len)..];
    let name = tag.map_or("", |line| line[TAG.len()..].trim());
    if name.is_empty() {
        return Ok((tag, sniff(body)));
    }
    match name.parse() {
        Ok(syntax) => Ok((tag, syntax)),
        Err(_unknown) => {
            let offset = text.find(name).unwrap_or(TAG.len());
            let position = Position::locate(text, TextSize::try_from(offset).unwrap_or_default());
            Err(ParseError { position, expected: "json, toml or env".to_string(), found: format!("`{name}`") }.into())
        }
    }
}

/// Guesses the syntax of untagged content: an object means JSON, a section
/// header means TOML, anything else is env.
pub(crate) fn sniff(body: &str) -> Syntax {
    let first = body.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if first.starts_with('{') {
        return Syntax::Json;
    }
    if body.lines().any(|line| line.trim_start().starts_with('[')) { Syntax::Toml } else { Syntax::Env }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_line_needs_a_boundary() {
        assert_eq!(tag_line("#!7cfg toml\na = 1\n"), Some("#!7cfg toml\n"));
        assert_eq!(tag_line("#!7cfg"), Some("#!7cfg"));
        assert_eq!(tag_line("#!7cfgtoml\n"), None);
        assert_eq!(tag_line("a = 1\n"), None);
    }

    #[test]
    fn choice_beats_tag_beats_sniffing() {
        let text = "#!7cfg toml\n{}";
        assert_eq!(resolve(text, Some(Syntax::Env)).map(|(_, syntax)| syntax), Ok(Syntax::Env));
        assert_eq!(resolve(text, None).map(|(_, syntax)| syntax), Ok(Syntax::Toml));
        assert_eq!(resolve("#!7cfg\n{}", None).map(|(_, syntax)| syntax), Ok(Syntax::Json));
    }

    #[test]
    fn sniffing() {
        assert_eq!(sniff("\n  {\"a\": 1}"), Syntax::Json);
        assert_eq!(sniff("# comment\n[server]\nport = 1\n"), Syntax::Toml);
        assert_eq!(sniff("A=1\nB=2\n"), Syntax::Env);
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let error = resolve("#!7cfg yaml\n", None).unwrap_err();
        assert_eq!(error.to_string(), "1:8: expected json, toml or env, found `yaml`");
    }
}
