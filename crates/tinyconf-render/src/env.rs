use tinyconf_errors::Loss;
use tinyconf_tree::{Entry, Node, NodeKind, Path, ScalarValue, Table};

use crate::json;
use crate::printer::{Printer, borrowed_separator};
use crate::scalar;

pub(crate) fn document(p: &mut Printer<'_>, root: &Node) {
    let Some(table) = root.as_table() else {
        return;
    };
    entries(p, table, "", &Path::root());

    let dangling = table.dangling();
    let dangling = if p.fresh { p.comment_lines(dangling) } else { dangling.to_string() };
    if !dangling.is_empty() {
        p.ensure_newline();
        p.push(&dangling);
    }
}

/// Prints the assignments of `table`. Nested tables are flattened into
/// `prefix_key` names, since env has no nesting.
fn entries(p: &mut Printer<'_>, table: &Table, prefix: &str, path: &Path) {
    let separator = borrowed_separator(table.entries()).unwrap_or_else(|| "=".to_string());
    for entry in table.entries() {
        let child = path.join(entry.key.name.as_str());
        match entry.node.kind() {
            NodeKind::Table(inner) => {
                p.warn(&child, Loss::NestedTable, "nested table is flattened into prefixed keys");
                if p.fresh {
                    header_comments(p, &entry.node);
                    p.drop_trivia(&child, &[inner.dangling()]);
                }
                let prefix = format!("{prefix}{}_", entry.key.name);
                entries(p, inner, &prefix, &child);
            }
            NodeKind::Array(array) => {
                p.warn(&child, Loss::Array, "array is written as a comma-separated string");
                if p.fresh {
                    drop_nested_trivia(p, &entry.node, &child);
                }
                let items: Vec<String> = array.items().iter().map(item_text).collect();
                line(p, entry, prefix, &separator, &child, &scalar::env_value(&items.join(",")));
            }
            NodeKind::Scalar(value) => {
                let text = match p.verbatim(&entry.node) {
                    Some(text) => text.to_string(),
                    None => scalar::env_value(&scalar_text(value.value())),
                };
                line(p, entry, prefix, &separator, &child, &text);
            }
        }
    }
}

/// The comments above a flattened table and on its header line, each on a
/// line of its own.
fn header_comments(p: &mut Printer<'_>, node: &Node) {
    let mut comments = p.comment_lines(&node.decor().leading);
    if let Some(comment) = p.line_comment(&node.decor().trailing) {
        comments.push_str(comment);
        comments.push('\n');
    }
    if !comments.is_empty() {
        p.ensure_newline();
        p.push(&comments);
    }
}

/// Trivia inside a value that collapses into one env string.
fn drop_nested_trivia(p: &mut Printer<'_>, node: &Node, path: &Path) {
    match node.kind() {
        NodeKind::Table(table) => {
            p.drop_trivia(path, &[table.dangling()]);
            for entry in table.entries() {
                let child = path.join(entry.key.name.as_str());
                let decor = entry.node.decor();
                p.drop_trivia(&child, &[&decor.leading, &decor.trailing]);
                drop_nested_trivia(p, &entry.node, &child);
            }
        }
        NodeKind::Array(array) => {
            p.drop_trivia(path, &[array.dangling()]);
            for (index, item) in array.items().iter().enumerate() {
                let child = path.join(index);
                p.drop_trivia(&child, &[&item.decor().leading, &item.decor().trailing]);
                drop_nested_trivia(p, item, &child);
            }
        }
        NodeKind::Scalar(_) => {}
    }
}

fn line(p: &mut Printer<'_>, entry: &Entry, prefix: &str, separator: &str, path: &Path, value: &str) {
    let node = &entry.node;
    p.ensure_newline();
    if p.fresh {
        p.push(&p.comment_lines(&node.decor().leading));
    } else if p.has_layout(node) {
        p.push(&node.decor().leading);
    }

    match &entry.key.repr {
        Some(repr) if !p.fresh && prefix.is_empty() => p.push(repr),
        _ => {
            let name = format!("{prefix}{}", entry.key.name);
            let key = scalar::env_key(&name);
            if key != name {
                p.warn(path, Loss::Key, format!("`{name}` is written as `{key}`"));
            }
            p.push(&key);
        }
    }
    match &entry.key.separator {
        Some(own) if !p.fresh => p.push(own),
        _ if p.fresh => p.push("="),
        _ => p.push(separator),
    }
    p.push(value);

    if p.fresh {
        if let Some(comment) = p.line_comment(&node.decor().trailing) {
            p.push(" ");
            p.push(comment);
        }
        p.newline();
    } else if p.has_layout(node) {
        p.push(&node.decor().trailing);
    } else {
        p.newline();
    }
}

/// Unquoted text of a scalar; null has none.
fn scalar_text(value: &ScalarValue) -> String {
    match value {
        ScalarValue::String(s) => s.clone(),
        ScalarValue::Integer(i) => i.to_string(),
        ScalarValue::Float(f) => scalar::toml_float(*f),
        ScalarValue::Boolean(b) => b.to_string(),
        ScalarValue::Null => String::new(),
    }
}

fn item_text(item: &Node) -> String {
    match item.as_scalar() {
        Some(scalar) => scalar_text(scalar.value()),
        None => json::compact(item),
    }
}
