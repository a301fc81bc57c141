use text_size::{TextRange, TextSize};
use tinyconf_errors::{DuplicateKeyError, SyntaxError};
use tinyconf_syntax::SyntaxKind::*;
use tinyconf_syntax::SyntaxSet;
use tinyconf_tokenizer::{LexMode, Syntax};
use tinyconf_tree::{Decor, Key, Node, Scalar, ScalarValue, Table, TableStyle};

use crate::EnvOptions;
use crate::grammar::rest_of_line;
use crate::parser::Parser;
use crate::scalars;

const LINE_START: SyntaxSet = SyntaxSet::new([EXPORT_KW, BARE_KEY]);

pub(crate) fn document(p: &mut Parser<'_>, options: &EnvOptions) -> Result<Node, SyntaxError> {
    let start = p.last_end();
    let mut root = Table::new(TableStyle::Root);
    let mut line_start = start;

    loop {
        p.set_mode(LexMode::Key);
        match p.peek_kind()? {
            NEWLINE => {
                p.bump()?;
            }
            EOF => {
                let end = p.peek()?.range.start();
                root.set_dangling(p.between(line_start, end));
                break;
            }
            _ => line_start = assignment(p, &mut root, line_start, options)?,
        }
    }

    Ok(Node::parsed(root, TextRange::new(start, TextSize::of(p.text()))))
}

/// `[export ]KEY=VALUE`, returning where the next line starts.
fn assignment(
    p: &mut Parser<'_>,
    root: &mut Table,
    line_start: TextSize,
    options: &EnvOptions,
) -> Result<TextSize, SyntaxError> {
    let first = p.expect_any(LINE_START)?;
    let name = if first.kind == EXPORT_KW { p.expect(BARE_KEY)? } else { first.clone() };
    let eq = p.expect(EQ)?;

    p.set_mode(LexMode::Value);
    let node = match p.peek_kind()? {
        NEWLINE | EOF => {
            let span = TextRange::empty(eq.range.end());
            Node::parsed(Scalar::parsed(ScalarValue::String(String::new()), ""), span)
        }
        BASIC_STRING | LITERAL_STRING => {
            let token = p.bump()?;
            let raw = p.slice(token.range);
            let value = scalars::string(raw, token.kind, Syntax::Env)
                .map_err(|expected| p.lex_error(token.range.start(), expected))?;
            Node::parsed(Scalar::parsed(ScalarValue::String(value), raw), token.range)
        }
        ENV_VALUE => {
            let token = p.bump()?;
            let raw = p.slice(token.range);
            let value =
                if options.infer_scalars { infer(raw) } else { ScalarValue::String(raw.to_string()) };
            Node::parsed(Scalar::parsed(value, raw), token.range)
        }
        _ => return Err(p.unexpected("a value")),
    };

    let value_span = node.span().unwrap_or_default();
    let (trailing, line_end) = rest_of_line(p, value_span.end())?;

    let key = Key::parsed(
        p.slice(name.range),
        p.between(first.range.start(), name.range.end()),
        p.between(name.range.end(), value_span.start()),
    );
    let decor = Decor::new(p.between(line_start, first.range.start()), trailing);
    if let Err(key) = root.insert(key, node.with_decor(decor)) {
        let position = Some(p.position(name.range.start()));
        return Err(DuplicateKeyError { key: key.name, position }.into());
    }

    Ok(line_end)
}

/// Unquoted `true`/`false` and numbers become typed scalars.
fn infer(raw: &str) -> ScalarValue {
    match raw {
        "true" => return ScalarValue::Boolean(true),
        "false" => return ScalarValue::Boolean(false),
        _ => {}
    }
    if let Ok(integer) = raw.parse::<i64>() {
        return ScalarValue::Integer(integer);
    }
    let numeric = raw.bytes().any(|b| b.is_ascii_digit())
        && raw.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    match raw.parse::<f64>() {
        Ok(float) if numeric => ScalarValue::Float(float),
        _ => ScalarValue::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_is_conservative() {
        assert_eq!(infer("8080"), ScalarValue::Integer(8080));
        assert_eq!(infer("-1.5e3"), ScalarValue::Float(-1500.0));
        assert_eq!(infer("true"), ScalarValue::Boolean(true));
        assert_eq!(infer("inf"), ScalarValue::String("inf".into()));
        assert_eq!(infer("1.2.3"), ScalarValue::String("1.2.3".into()));
        assert_eq!(infer("TRUE"), ScalarValue::String("TRUE".into()));
    }
}
