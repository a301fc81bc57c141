use tinyconf_errors::Loss;
use tinyconf_tree::{Array, ArrayStyle, Entry, Node, NodeKind, Path, ScalarValue, Table, TableStyle};

use crate::printer::{Printer, borrowed_leading, borrowed_separator};
use crate::scalar;

/// A `[table]` or an `[[array]]` item.
struct Section<'n> {
    keys: Vec<String>,
    path: Path,
    node: &'n Node,
    table: &'n Table,
    array_item: bool,
}

/// A `key = value` of a table, with dotted tables expanded into their
/// leaves.
struct Line<'n> {
    key: String,
    entry: &'n Entry,
    path: Path,
}

/// The root body, then every section in source order, then the trivia at
/// the end of the file.
pub(crate) fn document(p: &mut Printer<'_>, root: &Node) {
    let Some(table) = root.as_table() else {
        return;
    };
    let path = Path::root();
    body(p, table, &path);

    let mut sections = Vec::new();
    collect(p, table, &[], &path, &mut sections);
    for section in order(sections) {
        print_section(p, &section);
    }

    let dangling = table.dangling();
    let dangling = if p.fresh { p.comment_lines(dangling) } else { dangling.to_string() };
    if !dangling.is_empty() {
        p.ensure_newline();
        p.push(&dangling);
    }
}

/// Whether a child of a line-based table is printed under its own header.
fn is_section(p: &Printer<'_>, node: &Node) -> bool {
    match node.kind() {
        NodeKind::Table(table) => {
            p.fresh || matches!(table.style(), TableStyle::Header | TableStyle::Implicit | TableStyle::Auto)
        }
        NodeKind::Array(array) => {
            (p.fresh || array.style() == ArrayStyle::Tables)
                && !array.is_empty()
                && array.items().iter().all(|item| item.as_table().is_some())
        }
        NodeKind::Scalar(_) => false,
    }
}

fn key_text(p: &Printer<'_>, entry: &Entry) -> String {
    match &entry.key.repr {
        Some(repr) if !p.fresh => repr.clone(),
        _ => scalar::toml_key(&entry.key.name),
    }
}

fn flatten<'n>(
    p: &Printer<'_>,
    table: &'n Table,
    prefix: &str,
    path: &Path,
    skip_sections: bool,
    lines: &mut Vec<Line<'n>>,
) {
    for entry in table.entries() {
        if skip_sections && is_section(p, &entry.node) {
            continue;
        }
        let child = path.join(entry.key.name.as_str());
        let key = format!("{prefix}{}", key_text(p, entry));
        match entry.node.as_table() {
            Some(dotted) if !p.fresh && dotted.style() == TableStyle::Dotted => {
                let separator = entry.key.separator.as_deref().unwrap_or(".");
                flatten(p, dotted, &format!("{key}{separator}"), &child, skip_sections, lines);
            }
            _ => lines.push(Line { key, entry, path: child }),
        }
    }
}

fn body(p: &mut Printer<'_>, table: &Table, path: &Path) {
    let mut lines = Vec::new();
    flatten(p, table, "", path, true, &mut lines);
    if !p.fresh {
        in_source_order(&mut lines);
    }
    let nodes: Vec<&Node> = lines.iter().map(|line| &line.entry.node).collect();
    let separator = borrowed_separator(lines.iter().map(|line| line.entry)).unwrap_or_else(|| " = ".to_string());

    for (index, line) in lines.iter().enumerate() {
        let node = &line.entry.node;
        p.ensure_newline();
        if p.fresh {
            p.push(&p.comment_lines(&node.decor().leading));
        } else if p.has_layout(node) {
            p.push(&node.decor().leading);
        } else {
            p.push(&borrowed_leading(p, nodes.iter().copied(), index, false).unwrap_or_default());
        }

        p.push(&line.key);
        match &line.entry.key.separator {
            Some(own) if !p.fresh => p.push(own),
            _ if p.fresh => p.push(" = "),
            _ => p.push(&separator),
        }
        value(p, node, &line.path);
        end_of_line(p, node);
    }
}

/// Flattening groups the leaves of a dotted table together; put them back
/// where they were in the file. Lines without an origin stay right after the
/// line before them.
fn in_source_order(lines: &mut Vec<Line<'_>>) {
    let mut latest = 0;
    let mut keyed: Vec<(u32, Line<'_>)> = lines
        .drain(..)
        .map(|line| {
            let origin = line.entry.node.origin().map_or(latest, u32::from);
            latest = latest.max(origin);
            (origin, line)
        })
        .collect();
    keyed.sort_by_key(|(origin, _)| *origin);
    lines.extend(keyed.into_iter().map(|(_, line)| line));
}

fn end_of_line(p: &mut Printer<'_>, node: &Node) {
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

fn collect<'n>(p: &Printer<'_>, table: &'n Table, keys: &[String], path: &Path, sections: &mut Vec<Section<'n>>) {
    for entry in table.entries() {
        let node = &entry.node;
        let mut child_keys = keys.to_vec();
        child_keys.push(entry.key.name.clone());
        let child = path.join(entry.key.name.as_str());

        match node.kind() {
            NodeKind::Table(inner) if is_section(p, node) => {
                sections.push(Section {
                    keys: child_keys.clone(),
                    path: child.clone(),
                    node,
                    table: inner,
                    array_item: false,
                });
                collect(p, inner, &child_keys, &child, sections);
            }
            // Headers may extend a table defined by dotted keys.
            NodeKind::Table(inner) if !p.fresh && inner.style() == TableStyle::Dotted => {
                collect(p, inner, &child_keys, &child, sections);
            }
            NodeKind::Array(array) if is_section(p, node) => {
                for (index, item) in array.items().iter().enumerate() {
                    let Some(inner) = item.as_table() else {
                        continue;
                    };
                    let item_path = child.join(index);
                    sections.push(Section {
                        keys: child_keys.clone(),
                        path: item_path.clone(),
                        node: item,
                        table: inner,
                        array_item: true,
                    });
                    collect(p, inner, &child_keys, &item_path, sections);
                }
            }
            _ => {}
        }
    }
}

/// Sorts sections by source position. A section without one (built from a
/// value, or an implicit parent) takes the first position among its
/// descendants, or else the position of the section before it.
fn order(sections: Vec<Section<'_>>) -> Vec<Section<'_>> {
    let mut previous = 0;
    let mut positions = Vec::with_capacity(sections.len());
    for (index, section) in sections.iter().enumerate() {
        let position = section
            .node
            .position()
            .or_else(|| {
                sections[index + 1..]
                    .iter()
                    .take_while(|next| next.path.starts_with(&section.path))
                    .filter_map(|next| next.node.position())
                    .min()
            })
            .unwrap_or(previous);
        previous = position;
        positions.push(position);
    }

    let mut ordered: Vec<(u32, Section<'_>)> = positions.into_iter().zip(sections).collect();
    ordered.sort_by_key(|(position, _)| *position);
    ordered.into_iter().map(|(_, section)| section).collect()
}

fn print_section(p: &mut Printer<'_>, section: &Section<'_>) {
    let Section { keys, path, node, table, array_item } = section;

    let mut lines = Vec::new();
    flatten(p, table, "", path, true, &mut lines);
    let explicit = !p.fresh && table.style() == TableStyle::Header;
    if !(*array_item || explicit || table.is_empty() || !lines.is_empty()) {
        return;
    }

    let keys: Vec<String> = keys.iter().map(|key| scalar::toml_key(key)).collect();
    let header = if *array_item { format!("[[{}]]", keys.join(".")) } else { format!("[{}]", keys.join(".")) };

    p.ensure_newline();
    if p.has_layout(node) {
        p.push(&node.decor().leading);
        p.push(table.header().unwrap_or(&header));
        end_of_line(p, node);
    } else {
        if !p.out.is_empty() {
            p.newline();
        }
        if p.fresh {
            p.push(&p.comment_lines(&node.decor().leading));
        }
        p.push(&header);
        end_of_line(p, node);
    }
    body(p, table, path);
}

fn value(p: &mut Printer<'_>, node: &Node, path: &Path) {
    if let Some(text) = p.verbatim(node) {
        p.push(text);
        return;
    }
    match node.kind() {
        NodeKind::Table(table) => inline_table(p, table, path),
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
        ScalarValue::Float(f) => scalar::toml_float(*f),
        ScalarValue::Boolean(b) => b.to_string(),
        ScalarValue::Null => {
            p.warn(path, Loss::Value, "null is written as an empty string");
            "\"\"".to_string()
        }
    }
}

fn inline_table(p: &mut Printer<'_>, table: &Table, path: &Path) {
    let mut lines = Vec::new();
    flatten(p, table, "", path, false, &mut lines);

    let layout = lines.iter().any(|line| p.has_layout(&line.entry.node));
    if lines.is_empty() {
        p.push("{");
        if !p.fresh {
            p.push(table.dangling());
        }
        return p.push("}");
    }
    if p.fresh || table.style() != TableStyle::Braced || !layout {
        p.push("{ ");
        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                p.push(", ");
            }
            p.push(&line.key);
            p.push(" = ");
            value(p, &line.entry.node, &line.path);
        }
        return p.push(" }");
    }

    let nodes: Vec<&Node> = lines.iter().map(|line| &line.entry.node).collect();
    let separator = borrowed_separator(lines.iter().map(|line| line.entry)).unwrap_or_else(|| " = ".to_string());
    p.push("{");
    for (index, line) in lines.iter().enumerate() {
        let node = &line.entry.node;
        if p.has_layout(node) {
            p.push(&node.decor().leading);
        } else {
            p.push(&borrowed_leading(p, nodes.iter().copied(), index, true).unwrap_or_else(|| " ".to_string()));
        }
        p.push(&line.key);
        p.push(line.entry.key.separator.as_deref().unwrap_or(&separator));
        value(p, node, &line.path);
        if p.has_layout(node) {
            p.push(&node.decor().trailing);
        }
        if index + 1 < lines.len() {
            p.push(",");
        }
    }
    p.push(table.dangling());
    p.push("}");
}

fn list(p: &mut Printer<'_>, array: &Array, path: &Path) {
    let items = array.items();
    if items.is_empty() && !p.fresh {
        p.push("[");
        p.push(array.dangling());
        return p.push("]");
    }
    if p.fresh || !items.iter().any(|item| p.has_layout(item)) {
        p.push("[");
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                p.push(", ");
            }
            value(p, item, &path.join(index));
        }
        return p.push("]");
    }

    p.push("[");
    for (index, item) in items.iter().enumerate() {
        if p.has_layout(item) {
            p.push(&item.decor().leading);
        } else {
            p.push(&borrowed_leading(p, items, index, true).unwrap_or_default());
        }
        value(p, item, &path.join(index));
        if p.has_layout(item) {
            p.push(&item.decor().trailing);
        }
        if index + 1 < items.len() || array.trailing_comma() {
            p.push(",");
        }
    }
    p.push(array.dangling());
    p.push("]");
}
