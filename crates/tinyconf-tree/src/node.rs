use std::fmt::Write as _;

use indexmap::IndexMap;
use indexmap::map::Entry as MapEntry;
use text_size::{TextRange, TextSize};
use tinyconf_errors::{EditError, PathNotFoundError, TypeMismatchError};

use crate::{Path, Segment, Value};

/// Opaque source text attached around a node.
///
/// For an item of a line-based table, `leading` is everything between the end
/// of the previous line and the key (blank lines, comment lines,
/// indentation) and `trailing` is the rest of the item's line, line
/// terminator included. Inside brackets, `leading` runs from the previous
/// `,` (or the opening bracket) to the item and `trailing` from the item to
/// the next `,`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Decor {
    pub leading: String,
    pub trailing: String,
}

impl Decor {
    pub fn new(leading: impl Into<String>, trailing: impl Into<String>) -> Self {
        Self { leading: leading.into(), trailing: trailing.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    kind: NodeKind,
    decor: Decor,
    span: Option<TextRange>,
    dirty: bool,
    position: Option<u32>,
    origin: Option<TextSize>,
    layout: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Table(Table),
    Array(Array),
    Scalar(Scalar),
}

impl Node {
    /// A node read from source, covering `span`.
    pub fn parsed(kind: impl Into<NodeKind>, span: TextRange) -> Self {
        Self {
            kind: kind.into(),
            decor: Decor::default(),
            span: Some(span),
            dirty: false,
            position: None,
            origin: Some(span.start()),
            layout: true,
        }
    }

    /// A node with no source text behind it.
    pub fn synthetic(kind: impl Into<NodeKind>) -> Self {
        Self {
            kind: kind.into(),
            decor: Decor::default(),
            span: None,
            dirty: true,
            position: None,
            origin: None,
            layout: false,
        }
    }

    pub fn from_value(value: Value) -> Self {
        let kind = match value {
            Value::Table(entries) => {
                let mut table = Table::new(TableStyle::Auto);
                for (name, value) in entries {
                    table.entries.insert(name.clone(), Entry { key: Key::new(name), node: Self::from_value(value) });
                }
                NodeKind::Table(table)
            }
            Value::Array(items) => {
                let mut array = Array::new(ArrayStyle::Bracketed);
                array.items.extend(items.into_iter().map(Self::from_value));
                NodeKind::Array(array)
            }
            Value::String(s) => NodeKind::Scalar(Scalar::new(ScalarValue::String(s))),
            Value::Integer(i) => NodeKind::Scalar(Scalar::new(ScalarValue::Integer(i))),
            Value::Float(f) => NodeKind::Scalar(Scalar::new(ScalarValue::Float(f))),
            Value::Boolean(b) => NodeKind::Scalar(Scalar::new(ScalarValue::Boolean(b))),
            Value::Null => NodeKind::Scalar(Scalar::new(ScalarValue::Null)),
        };
        Self::synthetic(kind)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn decor(&self) -> &Decor {
        &self.decor
    }

    pub fn decor_mut(&mut self) -> &mut Decor {
        &mut self.decor
    }

    pub fn with_decor(mut self, decor: Decor) -> Self {
        self.decor = decor;
        self
    }

    /// The source range of the node itself, trivia excluded. `None` for
    /// synthetic nodes.
    pub fn span(&self) -> Option<TextRange> {
        self.span
    }

    pub fn set_span(&mut self, span: TextRange) {
        self.span = Some(span);
        self.layout = true;
    }

    pub fn is_synthetic(&self) -> bool {
        self.span.is_none()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Neither dirty nor synthetic: the source span can be emitted verbatim.
    pub fn is_clean(&self) -> bool {
        !self.dirty && self.span.is_some()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Source ordinal of a TOML section, used to keep sections in file order.
    pub fn position(&self) -> Option<u32> {
        self.position
    }

    pub fn set_position(&mut self, position: Option<u32>) {
        self.position = position;
    }

    /// Where the node started in the source. Survives `set`, so printers can
    /// keep lines in file order after a rewrite.
    pub fn origin(&self) -> Option<TextSize> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Option<TextSize>) {
        self.origin = origin;
    }

    /// The node came from source, or took the place of one together with its
    /// trivia. Only such nodes print their own line endings.
    pub fn has_layout(&self) -> bool {
        self.layout || !self.decor.is_empty()
    }

    /// Takes the place of `old`: the source order always, the trivia and line
    /// layout only when `keep_decor` is set.
    pub(crate) fn replace(&mut self, old: &mut Self, keep_decor: bool) {
        self.origin = old.origin;
        if keep_decor {
            self.decor = std::mem::take(&mut old.decor);
            self.layout = old.layout;
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match &self.kind {
            NodeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match &mut self.kind {
            NodeKind::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match &self.kind {
            NodeKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match &mut self.kind {
            NodeKind::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.kind {
            NodeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut Scalar> {
        match &mut self.kind {
            NodeKind::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Table(_) => "table",
            NodeKind::Array(_) => "array",
            NodeKind::Scalar(scalar) => scalar.value.type_name(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_table()?.get(key)
    }

    pub fn child(&self, segment: &Segment) -> Option<&Self> {
        match (segment, &self.kind) {
            (Segment::Key(key), NodeKind::Table(table)) => table.get(key),
            (Segment::Index(index), NodeKind::Array(array)) => array.get(*index),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, segment: &Segment) -> Option<&mut Self> {
        match (segment, &mut self.kind) {
            (Segment::Key(key), NodeKind::Table(table)) => table.get_mut(key),
            (Segment::Index(index), NodeKind::Array(array)) => array.get_mut(*index),
            _ => None,
        }
    }

    pub fn get_path(&self, path: &Path) -> Option<&Self> {
        path.segments().iter().try_fold(self, |node, segment| node.child(segment))
    }

    /// Like [`Node::get_path`], but says which segment failed and why.
    pub fn resolve(&self, path: &Path) -> Result<&Self, EditError> {
        let mut node = self;
        for (depth, segment) in path.segments().iter().enumerate() {
            let expected = match (segment, &node.kind) {
                (Segment::Key(_), NodeKind::Table(_)) | (Segment::Index(_), NodeKind::Array(_)) => None,
                (Segment::Key(_), _) => Some("table"),
                (Segment::Index(_), _) => Some("array"),
            };
            if let Some(expected) = expected {
                let path = path.prefix(depth).to_string();
                return Err(TypeMismatchError { path, expected, found: node.type_name() }.into());
            }

            node = node.child(segment).ok_or_else(|| PathNotFoundError {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        }
        Ok(node)
    }

    /// Direct children in document order.
    pub fn children(&self) -> Vec<(Segment, &Self)> {
        match &self.kind {
            NodeKind::Table(table) => {
                table.entries().map(|entry| (Segment::Key(entry.key.name.clone()), &entry.node)).collect()
            }
            NodeKind::Array(array) => {
                array.items().iter().enumerate().map(|(i, item)| (Segment::Index(i), item)).collect()
            }
            NodeKind::Scalar(_) => Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        match &self.kind {
            NodeKind::Table(table) => Value::Table(
                table.entries().map(|entry| (entry.key.name.clone(), entry.node.to_value())).collect(),
            ),
            NodeKind::Array(array) => Value::Array(array.items().iter().map(Self::to_value).collect()),
            NodeKind::Scalar(scalar) => scalar.value.to_value(),
        }
    }

    /// The node's original text, if it is still clean.
    pub fn original_text<'a>(&self, source: &'a str) -> Option<&'a str> {
        if !self.is_clean() {
            return None;
        }
        source.get(std::ops::Range::<usize>::from(self.span?))
    }

    /// Equality of content and order, ignoring trivia and layout.
    pub fn structural_eq(&self, other: &Self) -> bool {
        match (&self.kind, &other.kind) {
            (NodeKind::Table(a), NodeKind::Table(b)) => {
                a.len() == b.len()
                    && a.entries().zip(b.entries()).all(|(a, b)| {
                        a.key.name == b.key.name && a.node.structural_eq(&b.node)
                    })
            }
            (NodeKind::Array(a), NodeKind::Array(b)) => {
                a.len() == b.len() && a.items().iter().zip(b.items()).all(|(a, b)| a.structural_eq(b))
            }
            (NodeKind::Scalar(a), NodeKind::Scalar(b)) => a.value.same_as(&b.value),
            _ => false,
        }
    }

    /// An indented dump of the tree with its trivia, for tests and debugging.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_into(&mut out, "", 0);
        out
    }

    fn outline_into(&self, out: &mut String, label: &str, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}{label}");
        match &self.kind {
            NodeKind::Table(table) => {
                let _ = write!(out, "table {:?}", table.style);
                if let Some(header) = &table.header {
                    let _ = write!(out, " {header:?}");
                }
            }
            NodeKind::Array(array) => {
                let _ = write!(out, "array {:?}", array.style);
            }
            NodeKind::Scalar(scalar) => match &scalar.repr {
                Some(repr) => {
                    let _ = write!(out, "{} {repr}", scalar.value.type_name());
                }
                None => {
                    let _ = write!(out, "{} {:?}", scalar.value.type_name(), scalar.value);
                }
            },
        }
        if let Some(position) = self.position {
            let _ = write!(out, " #{position}");
        }
        if !self.decor.leading.is_empty() {
            let _ = write!(out, " leading={:?}", self.decor.leading);
        }
        if !self.decor.trailing.is_empty() {
            let _ = write!(out, " trailing={:?}", self.decor.trailing);
        }
        out.push('\n');

        let dangling = match &self.kind {
            NodeKind::Table(table) => {
                for entry in table.entries() {
                    let label = match &entry.key.repr {
                        Some(repr) => format!("{repr}: "),
                        None => format!("<{}>: ", entry.key.name),
                    };
                    entry.node.outline_into(out, &label, depth + 1);
                }
                &table.dangling
            }
            NodeKind::Array(array) => {
                for item in array.items() {
                    item.outline_into(out, "- ", depth + 1);
                }
                &array.dangling
            }
            NodeKind::Scalar(_) => return,
        };
        if !dangling.is_empty() {
            let _ = writeln!(out, "{indent}  dangling={dangling:?}");
        }
    }
}

/// How a table appears in its source syntax.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableStyle {
    /// The implicit table of a line-based document.
    Root,
    /// `{ ... }`: a JSON object or a TOML inline table.
    Braced,
    /// A TOML `[section]` or an item of a `[[section]]` array.
    Header,
    /// A TOML parent that only exists because of a deeper header.
    Implicit,
    /// A TOML parent created by a dotted key such as `a.b = 1`.
    Dotted,
    /// Created by an edit; the printer picks a layout.
    Auto,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    entries: IndexMap<String, Entry>,
    style: TableStyle,
    header: Option<String>,
    dangling: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub key: Key,
    pub node: Node,
}

/// A table key together with the source text around it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Key {
    pub name: String,
    /// Raw key text: `"a"`, `'b'`, `export PORT`.
    pub repr: Option<String>,
    /// Raw text between the key and its value: `": "`, `" = "`, `.`.
    pub separator: Option<String>,
}

impl Key {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), repr: None, separator: None }
    }

    pub fn parsed(name: impl Into<String>, repr: impl Into<String>, separator: impl Into<String>) -> Self {
        Self { name: name.into(), repr: Some(repr.into()), separator: Some(separator.into()) }
    }
}

impl Table {
    pub fn new(style: TableStyle) -> Self {
        Self { entries: IndexMap::new(), style, header: None, dangling: String::new() }
    }

    pub fn style(&self) -> TableStyle {
        self.style
    }

    pub fn set_style(&mut self, style: TableStyle) {
        self.style = style;
    }

    /// Raw `[a.b]` / `[[a.b]]` text of a TOML section.
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    pub fn set_header(&mut self, header: Option<String>) {
        self.header = header;
    }

    /// Trivia after the last entry and before the closing brace (or the end
    /// of a line-based document).
    pub fn dangling(&self) -> &str {
        &self.dangling
    }

    pub fn set_dangling(&mut self, dangling: impl Into<String>) {
        self.dangling = dangling.into();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key).map(|entry| &entry.node)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key).map(|entry| &mut entry.node)
    }

    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    pub fn last_entry_mut(&mut self) -> Option<&mut Entry> {
        self.entries.last_mut().map(|(_, entry)| entry)
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &Entry> + ExactSizeIterator {
        self.entries.values()
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    /// Appends an entry, handing the key back if the name is taken.
    pub fn insert(&mut self, key: Key, node: Node) -> Result<&mut Node, Key> {
        match self.entries.entry(key.name.clone()) {
            MapEntry::Occupied(_) => Err(key),
            MapEntry::Vacant(slot) => Ok(&mut slot.insert(Entry { key, node }).node),
        }
    }

    /// Inserts an entry at `index` (clamped to the length). The name must be
    /// free.
    pub(crate) fn insert_at(&mut self, index: usize, key: Key, node: Node) {
        let index = index.min(self.entries.len());
        self.entries.shift_insert(index, key.name.clone(), Entry { key, node });
    }

    pub(crate) fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.shift_remove(key)
    }

    pub(crate) fn rename(&mut self, from: &str, to: &str) -> Option<&mut Entry> {
        let (index, _, mut entry) = self.entries.shift_remove_full(from)?;
        entry.key.name = to.to_string();
        entry.key.repr = None;
        self.entries.shift_insert(index, to.to_string(), entry);
        self.entries.get_index_mut(index).map(|(_, entry)| entry)
    }

    /// Rebuilds the map in `order`, which must name every key exactly once.
    pub(crate) fn reorder(&mut self, order: &[String]) {
        let mut entries = std::mem::take(&mut self.entries);
        for key in order {
            if let Some(entry) = entries.shift_remove(key) {
                self.entries.insert(key.clone(), entry);
            }
        }
        self.entries.extend(entries);
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArrayStyle {
    /// `[1, 2, 3]`
    Bracketed,
    /// TOML `[[section]]` items.
    Tables,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    items: Vec<Node>,
    style: ArrayStyle,
    dangling: String,
    trailing_comma: bool,
}

impl Array {
    pub fn new(style: ArrayStyle) -> Self {
        Self { items: Vec::new(), style, dangling: String::new(), trailing_comma: false }
    }

    pub fn style(&self) -> ArrayStyle {
        self.style
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Node] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    pub fn last_mut(&mut self) -> Option<&mut Node> {
        self.items.last_mut()
    }

    pub fn push(&mut self, item: Node) -> &mut Node {
        self.items.push(item);
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    pub(crate) fn insert(&mut self, index: usize, item: Node) {
        self.items.insert(index, item);
    }

    /// Removes the item at `index`. A comment left after its comma on the
    /// same line goes with it; the line break stays.
    pub(crate) fn remove(&mut self, index: usize) -> Node {
        let item = self.items.remove(index);
        let next = match self.items.get_mut(index) {
            Some(next) => &mut next.decor_mut().leading,
            None => &mut self.dangling,
        };
        if let Some(newline) = next.find('\n') {
            let end = next[..newline].strip_suffix('\r').map_or(newline, str::len);
            if !next[..end].trim().is_empty() {
                next.replace_range(..end, "");
            }
        }
        item
    }

    pub fn dangling(&self) -> &str {
        &self.dangling
    }

    pub fn set_dangling(&mut self, dangling: impl Into<String>) {
        self.dangling = dangling.into();
    }

    pub fn trailing_comma(&self) -> bool {
        self.trailing_comma
    }

    pub fn set_trailing_comma(&mut self, trailing_comma: bool) {
        self.trailing_comma = trailing_comma;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl ScalarValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::Integer(*i),
            Self::Float(f) => Value::Float(*f),
            Self::Boolean(b) => Value::Boolean(*b),
            Self::Null => Value::Null,
        }
    }

    /// Equality where NaN equals NaN.
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }
}

/// A typed value and, until it is rewritten, its exact source text.
#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    value: ScalarValue,
    repr: Option<String>,
}

impl Scalar {
    pub fn new(value: ScalarValue) -> Self {
        Self { value, repr: None }
    }

    pub fn parsed(value: ScalarValue, repr: impl Into<String>) -> Self {
        Self { value, repr: Some(repr.into()) }
    }

    pub fn value(&self) -> &ScalarValue {
        &self.value
    }

    pub fn repr(&self) -> Option<&str> {
        self.repr.as_deref()
    }
}

impl From<Table> for NodeKind {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<Array> for NodeKind {
    fn from(array: Array) -> Self {
        Self::Array(array)
    }
}

impl From<Scalar> for NodeKind {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}
