use text_size::{TextRange, TextSize};
use tinyconf_errors::{DuplicateKeyError, SyntaxError};
use tinyconf_syntax::SyntaxKind::*;
use tinyconf_syntax::SyntaxSet;
use tinyconf_tokenizer::{LexMode, Syntax, Token};
use tinyconf_tree::{
    Array, ArrayStyle, Decor, Key, Node, NodeKind, Scalar, ScalarValue, Table, TableStyle,
};

use crate::grammar::{COMMA_OR_RIGHT_BRACE, COMMA_OR_RIGHT_BRACKET, rest_of_line};
use crate::parser::Parser;
use crate::scalars;

const KEY: SyntaxSet = SyntaxSet::new([BARE_KEY, BASIC_STRING, LITERAL_STRING]);

/// One segment of a dotted key.
struct KeyPart {
    name: String,
    range: TextRange,
}

/// `key = value`, not yet attached to a table.
struct Assignment {
    parts: Vec<KeyPart>,
    node: Node,
}

pub(crate) fn document(p: &mut Parser<'_>) -> Result<Node, SyntaxError> {
    let start = p.last_end();
    let mut root = Table::new(TableStyle::Root);
    // Keys of the table that `key = value` lines currently go to.
    let mut section: Vec<String> = Vec::new();
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
            LEFT_BRACKET => (section, line_start) = header(p, &mut root, line_start)?,
            _ => {
                let assignment = assignment(p)?;
                let value_end = p.last_end();
                let (trailing, line_end) = rest_of_line(p, value_end)?;
                let leading = p.between(line_start, assignment.parts[0].range.start());

                let Some(table) = section_table(&mut root, &section) else {
                    return Err(p.unexpected("a section"));
                };
                attach(p, table, assignment, Decor::new(leading, trailing))?;
                line_start = line_end;
            }
        }
    }

    Ok(Node::parsed(root, TextRange::new(start, TextSize::of(p.text()))))
}

/// The table a section path points at; arrays of tables resolve to their
/// last item.
fn section_table<'r>(root: &'r mut Table, keys: &[String]) -> Option<&'r mut Table> {
    let mut table = root;
    for key in keys {
        let node = table.get_mut(key)?;
        table = match node.kind_mut() {
            NodeKind::Table(inner) => inner,
            NodeKind::Array(array) => array.last_mut()?.as_table_mut()?,
            NodeKind::Scalar(_) => return None,
        };
    }
    Some(table)
}

/// `[a.b]` or `[[a.b]]`, up to and including the end of its line.
fn header(p: &mut Parser<'_>, root: &mut Table, line_start: TextSize) -> Result<(Vec<String>, TextSize), SyntaxError> {
    let open = p.bump()?;
    let is_array = {
        let next = p.peek()?;
        next.kind == LEFT_BRACKET && next.full_range().start() == open.range.end()
    };
    if is_array {
        p.bump()?;
    }

    let parts = key_path(p)?;
    let close = p.expect(RIGHT_BRACKET)?;
    if is_array {
        let second = p.expect(RIGHT_BRACKET)?;
        if second.full_range().start() != close.range.end() {
            return Err(p.lex_error(close.range.end(), "`]]`"));
        }
    }

    let header_span = TextRange::new(open.range.start(), p.last_end());
    let raw = p.slice(header_span).to_string();
    let (trailing, line_end) = rest_of_line(p, header_span.end())?;
    let decor = Decor::new(p.between(line_start, open.range.start()), trailing);

    let Some((last, parents)) = parts.split_last() else {
        return Err(p.unexpected("a key"));
    };
    let mut table = root;
    for part in parents {
        table = descend(p, table, part)?;
    }

    let position = Some(p.next_section());
    if is_array {
        if !table.contains_key(&last.name) {
            let array = Node::parsed(Array::new(ArrayStyle::Tables), header_span);
            let _ = table.insert(Key::new(last.name.as_str()), array);
        }
        let Some(array) = table.get_mut(&last.name).and_then(Node::as_array_mut) else {
            return Err(duplicate(p, last));
        };
        if array.style() != ArrayStyle::Tables {
            return Err(duplicate(p, last));
        }
        let mut item = Table::new(TableStyle::Header);
        item.set_header(Some(raw));
        let item = array.push(Node::parsed(item, header_span).with_decor(decor));
        item.set_position(position);
    } else if let Some(node) = table.get_mut(&last.name) {
        // A table created implicitly by an earlier header can be defined
        // once, later in the file.
        match node.as_table_mut() {
            Some(existing) if existing.style() == TableStyle::Implicit => {
                existing.set_style(TableStyle::Header);
                existing.set_header(Some(raw));
            }
            _ => return Err(duplicate(p, last)),
        }
        node.set_span(header_span);
        *node.decor_mut() = decor;
        node.set_position(position);
    } else {
        let mut defined = Table::new(TableStyle::Header);
        defined.set_header(Some(raw));
        let mut node = Node::parsed(defined, header_span).with_decor(decor);
        node.set_position(position);
        let _ = table.insert(Key::new(last.name.as_str()), node);
    }

    let section = parts.into_iter().map(|part| part.name).collect();
    Ok((section, line_end))
}

/// Steps through an intermediate header segment, creating an implicit
/// table when it does not exist yet.
fn descend<'r>(p: &Parser<'_>, table: &'r mut Table, part: &KeyPart) -> Result<&'r mut Table, SyntaxError> {
    if !table.contains_key(&part.name) {
        let implicit = Node::parsed(Table::new(TableStyle::Implicit), part.range);
        let _ = table.insert(Key::new(part.name.as_str()), implicit);
    }
    let Some(node) = table.get_mut(&part.name) else {
        return Err(duplicate(p, part));
    };
    match node.kind_mut() {
        NodeKind::Table(inner) if inner.style() != TableStyle::Braced => Ok(inner),
        NodeKind::Array(array) if array.style() == ArrayStyle::Tables => {
            array.last_mut().and_then(Node::as_table_mut).ok_or_else(|| duplicate(p, part))
        }
        _ => Err(duplicate(p, part)),
    }
}

fn duplicate(p: &Parser<'_>, part: &KeyPart) -> SyntaxError {
    DuplicateKeyError { key: part.name.clone(), position: Some(p.position(part.range.start())) }.into()
}

/// `a."b".c`
fn key_path(p: &mut Parser<'_>) -> Result<Vec<KeyPart>, SyntaxError> {
    let mut parts = Vec::new();
    loop {
        let token = p.expect_any(KEY)?;
        let name = match token.kind {
            BARE_KEY => p.slice(token.range).to_string(),
            _ => decode(p, &token)?,
        };
        parts.push(KeyPart { name, range: token.range });
        if !p.at(DOT)? {
            return Ok(parts);
        }
        p.bump()?;
    }
}

fn assignment(p: &mut Parser<'_>) -> Result<Assignment, SyntaxError> {
    p.set_mode(LexMode::Key);
    let parts = key_path(p)?;
    p.expect(EQ)?;
    p.set_mode(LexMode::Value);
    let node = value(p)?;
    Ok(Assignment { parts, node })
}

/// Inserts an assignment into `table`, creating the dotted tables its key
/// passes through. The line trivia goes on the leaf value.
fn attach(p: &Parser<'_>, table: &mut Table, assignment: Assignment, decor: Decor) -> Result<(), SyntaxError> {
    let Assignment { parts, node } = assignment;
    let value_start = node.span().map_or_else(|| p.last_end(), TextRange::start);

    let mut table = table;
    for (index, part) in parts.iter().enumerate() {
        let next = parts.get(index + 1).map_or(value_start, |next| next.range.start());
        let key = Key::parsed(part.name.as_str(), p.slice(part.range), p.between(part.range.end(), next));

        if index + 1 == parts.len() {
            return match table.insert(key, node.with_decor(decor)) {
                Ok(_) => Ok(()),
                Err(_) => Err(duplicate(p, part)),
            };
        }

        if !table.contains_key(&part.name) {
            let dotted = Node::parsed(Table::new(TableStyle::Dotted), part.range);
            let _ = table.insert(key, dotted);
        }
        table = match table.get_mut(&part.name).and_then(Node::as_table_mut) {
            Some(dotted) if dotted.style() == TableStyle::Dotted => dotted,
            _ => return Err(duplicate(p, part)),
        };
    }

    Err(p.lex_error(value_start, "a key"))
}

fn value(p: &mut Parser<'_>) -> Result<Node, SyntaxError> {
    match p.peek_kind()? {
        BASIC_STRING | LITERAL_STRING | MULTILINE_BASIC_STRING | MULTILINE_LITERAL_STRING => {
            let token = p.bump()?;
            let value = ScalarValue::String(decode(p, &token)?);
            Ok(scalar(p, &token, value))
        }
        INTEGER => {
            let token = p.bump()?;
            let integer = scalars::toml_integer(p.slice(token.range))
                .ok_or_else(|| p.lex_error(token.range.start(), "an integer in range"))?;
            Ok(scalar(p, &token, ScalarValue::Integer(integer)))
        }
        FLOAT => {
            let token = p.bump()?;
            let float = scalars::toml_float(p.slice(token.range))
                .ok_or_else(|| p.lex_error(token.range.start(), "a float"))?;
            Ok(scalar(p, &token, ScalarValue::Float(float)))
        }
        TRUE_KW | FALSE_KW => {
            let token = p.bump()?;
            Ok(scalar(p, &token, ScalarValue::Boolean(token.kind == TRUE_KW)))
        }
        // Date-times are kept as their text.
        DATETIME => {
            let token = p.bump()?;
            let text = p.slice(token.range).to_string();
            Ok(scalar(p, &token, ScalarValue::String(text)))
        }
        LEFT_BRACKET => {
            let (array, span) = p.node(array)?;
            Ok(Node::parsed(array, span))
        }
        LEFT_BRACE => {
            let (table, span) = p.node(inline_table)?;
            Ok(Node::parsed(table, span))
        }
        _ => Err(p.unexpected("a value")),
    }
}

fn skip_newlines(p: &mut Parser<'_>) -> Result<(), SyntaxError> {
    while p.at(NEWLINE)? {
        p.bump()?;
    }
    Ok(())
}

/// `[1, 2, 3]`, which may span lines and end with a comma.
fn array(p: &mut Parser<'_>) -> Result<Array, SyntaxError> {
    let mut array = Array::new(ArrayStyle::Bracketed);
    let mut end = p.expect(LEFT_BRACKET)?.range.end();

    loop {
        p.set_mode(LexMode::Value);
        skip_newlines(p)?;
        if p.at(RIGHT_BRACKET)? {
            let close = p.bump()?;
            array.set_dangling(p.between(end, close.range.start()));
            array.set_trailing_comma(!array.is_empty());
            return Ok(array);
        }

        let item_start = p.peek()?.range.start();
        let leading = p.between(end, item_start);
        let item = value(p)?;
        let value_end = p.last_end();

        skip_newlines(p)?;
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

/// `{ a = 1, b.c = 2 }` on a single line, without a trailing comma.
fn inline_table(p: &mut Parser<'_>) -> Result<Table, SyntaxError> {
    let mut table = Table::new(TableStyle::Braced);
    let mut end = p.expect(LEFT_BRACE)?.range.end();

    p.set_mode(LexMode::Key);
    if p.at(RIGHT_BRACE)? {
        let close = p.bump()?;
        table.set_dangling(p.between(end, close.range.start()));
        return Ok(table);
    }

    loop {
        p.set_mode(LexMode::Key);
        let key_start = p.peek()?.range.start();
        let leading = p.between(end, key_start);
        let assignment = assignment(p)?;
        let value_end = p.last_end();

        let next = p.expect_any(COMMA_OR_RIGHT_BRACE)?;
        let before_next = p.between(value_end, next.range.start());
        if next.kind == RIGHT_BRACE {
            attach(p, &mut table, assignment, Decor::new(leading, ""))?;
            table.set_dangling(before_next);
            return Ok(table);
        }
        attach(p, &mut table, assignment, Decor::new(leading, before_next))?;
        end = next.range.end();
    }
}

fn scalar(p: &Parser<'_>, token: &Token, value: ScalarValue) -> Node {
    Node::parsed(Scalar::parsed(value, p.slice(token.range)), token.range)
}

fn decode(p: &Parser<'_>, token: &Token) -> Result<String, SyntaxError> {
    scalars::string(p.slice(token.range), token.kind, Syntax::Toml)
        .map_err(|expected| p.lex_error(token.range.start(), expected))
}
