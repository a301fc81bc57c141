use tinyconf_errors::Loss;
use tinyconf_tree::{Array, Entry, Node, NodeKind, Path, ScalarValue, Table};

use crate::printer::{Printer, borrowed_leading, borrowed_separator};
use crate::scalar;

pub(crate) fn document(p: &mut Printer<'_>, root: &Node) {
    let path = Path::root();
    if p.fresh {
        p.drop_trivia(&path, &[&root.decor().leading, &root.decor().trailing]);
        value(p, root, &path);
        p.newline();
    } else {
        p.push(&root.decor().leading);
        value(p, root, &path);
        p.push(&root.decor().trailing);
    }
}

fn value(p: &mut Printer<'_>, node: &Node, path: &Path) {
    if let Some(text) = p.verbatim(node) {
        p.push(text);
        return;
    }
    match node.kind() {
        NodeKind::Table(table) => object(p, table, path),
        NodeKind::Array(array) => list(p, array, path),
        NodeKind::Scalar(scalar) => {
            let text = scalar_text(p, scalar.value(), path);
            p.push(&text);
        }
    }
}

fn scalar_text(p: &mut Printer<'_>, value: &ScalarValue, path: &Path) -> String {
    match value {
        ScalarValue::String(s) => scalar::quoted(s),
        ScalarValue::Integer(i) => i.to_string(),
        ScalarValue::Float(f) => scalar::json_float(*f).unwrap_or_else(|| {
            p.warn(path, Loss::Value, format!("`{f}` is written as null"));
            "null".to_string()
        }),
        ScalarValue::Boolean(b) => b.to_string(),
        ScalarValue::Null => "null".to_string(),
    }
}

fn object(p: &mut Printer<'_>, table: &Table, path: &Path) {
    let entries: Vec<&Entry> = table.entries().collect();
    if p.fresh {
        p.drop_trivia(path, &[table.dangling()]);
        for entry in &entries {
            let decor = entry.node.decor();
            p.drop_trivia(&path.join(entry.key.name.as_str()), &[&decor.leading, &decor.trailing]);
        }
    }
    if entries.is_empty() && !p.fresh {
        p.push("{");
        p.push(table.dangling());
        return p.push("}");
    }
    if p.fresh || !entries.iter().any(|entry| p.has_layout(&entry.node)) {
        return canonical_object(p, &entries, path);
    }

    p.push("{");
    let separator = borrowed_separator(entries.iter().copied()).unwrap_or_else(|| ": ".to_string());
    for (index, entry) in entries.iter().enumerate() {
        let node = &entry.node;
        if p.has_layout(node) {
            p.push(&node.decor().leading);
        } else {
            let leading = borrowed_leading(p, entries.iter().map(|entry| &entry.node), index, true);
            p.push(&leading.unwrap_or_default());
        }
        p.push(&entry.key.repr.clone().unwrap_or_else(|| scalar::quoted(&entry.key.name)));
        p.push(entry.key.separator.as_deref().unwrap_or(&separator));
        value(p, node, &path.join(entry.key.name.as_str()));
        p.push(&node.decor().trailing);
        if index + 1 < entries.len() {
            p.push(",");
        }
    }
    p.push(table.dangling());
    p.push("}");
}

fn canonical_object(p: &mut Printer<'_>, entries: &[&Entry], path: &Path) {
    if entries.is_empty() {
        return p.push("{}");
    }
    let indent = p.line_indent();
    let inner = format!("{indent}{}", p.indent_unit());
    p.push("{");
    p.newline();
    for (index, entry) in entries.iter().enumerate() {
        p.push(&inner);
        p.push(&scalar::quoted(&entry.key.name));
        p.push(": ");
        value(p, &entry.node, &path.join(entry.key.name.as_str()));
        if index + 1 < entries.len() {
            p.push(",");
        }
        p.newline();
    }
    p.push(&indent);
    p.push("}");
}

fn list(p: &mut Printer<'_>, array: &Array, path: &Path) {
    let items = array.items();
    if p.fresh {
        p.drop_trivia(path, &[array.dangling()]);
        for (index, item) in items.iter().enumerate() {
            p.drop_trivia(&path.join(index), &[&item.decor().leading, &item.decor().trailing]);
        }
    }
    if items.is_empty() && !p.fresh {
        p.push("[");
        p.push(array.dangling());
        return p.push("]");
    }
    if p.fresh || !items.iter().any(|item| p.has_layout(item)) {
        return canonical_array(p, items, path);
    }

    p.push("[");
    for (index, item) in items.iter().enumerate() {
        if p.has_layout(item) {
            p.push(&item.decor().leading);
        } else {
            p.push(&borrowed_leading(p, items, index, true).unwrap_or_default());
        }
        value(p, item, &path.join(index));
        p.push(&item.decor().trailing);
        if index + 1 < items.len() {
            p.push(",");
        }
    }
    p.push(array.dangling());
    p.push("]");
}

/// Scalars stay on one line; containers get one item per line.
fn canonical_array(p: &mut Printer<'_>, items: &[Node], path: &Path) {
    if items.is_empty() {
        return p.push("[]");
    }
    if items.iter().all(|item| matches!(item.kind(), NodeKind::Scalar(_))) {
        p.push("[");
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                p.push(", ");
            }
            value(p, item, &path.join(index));
        }
        return p.push("]");
    }

    let indent = p.line_indent();
    let inner = format!("{indent}{}", p.indent_unit());
    p.push("[");
    p.newline();
    for (index, item) in items.iter().enumerate() {
        p.push(&inner);
        value(p, item, &path.join(index));
        if index + 1 < items.len() {
            p.push(",");
        }
        p.newline();
    }
    p.push(&indent);
    p.push("]");
}

/// Single-line JSON for values other syntaxes can only hold as text.
pub(crate) fn compact(node: &Node) -> String {
    match node.kind() {
        NodeKind::Table(table) => {
            let entries: Vec<String> = table
                .entries()
                .map(|entry| format!("{}:{}", scalar::quoted(&entry.key.name), compact(&entry.node)))
                .collect();
            format!("{{{}}}", entries.join(","))
        }
        NodeKind::Array(array) => {
            let items: Vec<String> = array.items().iter().map(compact).collect();
            format!("[{}]", items.join(","))
        }
        NodeKind::Scalar(scalar) => match scalar.value() {
            ScalarValue::String(s) => scalar::quoted(s),
            ScalarValue::Integer(i) => i.to_string(),
            ScalarValue::Float(f) => scalar::json_float(*f).unwrap_or_else(|| "null".to_string()),
            ScalarValue::Boolean(b) => b.to_string(),
            ScalarValue::Null => "null".to_string(),
        },
    }
}
