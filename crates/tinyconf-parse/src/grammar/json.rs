use tinyconf_errors::{DuplicateKeyError, SyntaxError};
use tinyconf_syntax::SyntaxKind::*;
use tinyconf_tokenizer::{Syntax, Token};
use tinyconf_tree::{Array, ArrayStyle, Decor, Key, Node, Scalar, ScalarValue, Table, TableStyle};

use crate::grammar::{COMMA_OR_RIGHT_BRACE, COMMA_OR_RIGHT_BRACKET};
use crate::parser::Parser;
use crate::scalars;

/// A JSON document: one object, with the whitespace around it as root
/// trivia.
pub(crate) fn document(p: &mut Parser<'_>) -> Result<Node, SyntaxError> {
    let start = p.last_end();
    if !p.at(LEFT_BRACE)? {
        return Err(p.unexpected("`{`"));
    }
    let first = p.peek()?.range.start();
    let leading = p.between(start, first);

    let (table, span) = p.node(object)?;
    let eof = p.expect(EOF)?;
    let trailing = p.between(span.end(), eof.range.start());

    Ok(Node::parsed(table, span).with_decor(Decor::new(leading, trailing)))
}

fn object(p: &mut Parser<'_>) -> Result<Table, SyntaxError> {
    let mut table = Table::new(TableStyle::Braced);
    let mut end = p.expect(LEFT_BRACE)?.range.end();

    if p.at(RIGHT_BRACE)? {
        let close = p.bump()?;
        table.set_dangling(p.between(end, close.range.start()));
        return Ok(table);
    }

    loop {
        let key = p.expect(BASIC_STRING)?;
        let leading = p.between(end, key.range.start());
        let name = decode(p, &key)?;
        p.expect(COLON)?;

        let mut node = value(p)?;
        let value_end = p.last_end();
        let separator = p.between(key.range.end(), node.span().map_or(value_end, |span| span.start()));

        let next = p.expect_any(COMMA_OR_RIGHT_BRACE)?;
        let before_next = p.between(value_end, next.range.start());
        let closed = next.kind == RIGHT_BRACE;
        if closed {
            node = node.with_decor(Decor::new(leading, ""));
            table.set_dangling(before_next);
        } else {
            node = node.with_decor(Decor::new(leading, before_next));
        }

        let repr = p.slice(key.range);
        if let Err(key_name) = table.insert(Key::parsed(name, repr, separator), node) {
            let position = Some(p.position(key.range.start()));
            return Err(DuplicateKeyError { key: key_name.name, position }.into());
        }

        if closed {
            return Ok(table);
        }
        end = next.range.end();
    }
}

fn array(p: &mut Parser<'_>) -> Result<Array, SyntaxError> {
    let mut array = Array::new(ArrayStyle::Bracketed);
    let mut end = p.expect(LEFT_BRACKET)?.range.end();

    if p.at(RIGHT_BRACKET)? {
        let close = p.bump()?;
        array.set_dangling(p.between(end, close.range.start()));
        return Ok(array);
    }

    loop {
        let item_start = p.peek()?.range.start();
        let leading = p.between(end, item_start);
        let item = value(p)?;
        let value_end = p.last_end();

        let next = p.expect_any(COMMA_OR_RIGHT_BRACKET)?;
        let before_next = p.between(value_end, next.range.start());
        if next.kind == RIGHT_BRACKET {
            array.push(item.with_decor(Decor::new(leading, "")));
            array.set_dangling(before_next);
            return Ok(array);
        }
        array.push(item.with_decor(Decor::new(leading, before_next)));
        end = next.range.end();
    }
}

fn value(p: &mut Parser<'_>) -> Result<Node, SyntaxError> {
    match p.peek_kind()? {
        LEFT_BRACE => {
            let (table, span) = p.node(object)?;
            Ok(Node::parsed(table, span))
        }
        LEFT_BRACKET => {
            let (array, span) = p.node(array)?;
            Ok(Node::parsed(array, span))
        }
        BASIC_STRING => {
            let token = p.bump()?;
            let value = ScalarValue::String(decode(p, &token)?);
            Ok(scalar(p, &token, value))
        }
        INTEGER | FLOAT => {
            let token = p.bump()?;
            let raw = p.slice(token.range);
            let value = match raw.parse::<i64>() {
                Ok(integer) if token.kind == INTEGER => ScalarValue::Integer(integer),
                _ => match raw.parse::<f64>() {
                    Ok(float) => ScalarValue::Float(float),
                    Err(_) => return Err(p.lex_error(token.range.start(), "a number")),
                },
            };
            Ok(scalar(p, &token, value))
        }
        TRUE_KW | FALSE_KW => {
            let token = p.bump()?;
            Ok(scalar(p, &token, ScalarValue::Boolean(token.kind == TRUE_KW)))
        }
        NULL_KW => {
            let token = p.bump()?;
            Ok(scalar(p, &token, ScalarValue::Null))
        }
        _ => Err(p.unexpected("a JSON value")),
    }
}

fn scalar(p: &Parser<'_>, token: &Token, value: ScalarValue) -> Node {
    Node::parsed(Scalar::parsed(value, p.slice(token.range)), token.range)
}

fn decode(p: &Parser<'_>, token: &Token) -> Result<String, SyntaxError> {
    scalars::string(p.slice(token.range), token.kind, Syntax::Json)
        .map_err(|expected| p.lex_error(token.range.start(), expected))
}
