use rustc_hash::{FxHashMap, FxHashSet};
use text_size::TextSize;
use tinyconf_errors::{DuplicateKeyError, EditError, InvalidPermutationError, PathNotFoundError, TypeMismatchError};

use crate::{Array, Key, Node, NodeKind, Path, Segment, Table, Value};

/// The only writer of a [`Document`](crate::Document) tree.
///
/// Every operation validates the whole request before touching the tree, so
/// an `Err` always leaves it exactly as it was. A successful call marks the
/// changed node and each of its ancestors dirty.
pub struct Editor<'a> {
    root: &'a mut Node,
}

impl<'a> Editor<'a> {
    pub(crate) fn new(root: &'a mut Node) -> Self {
        Self { root }
    }
}

impl Editor<'_> {
    /// Replaces the node at `path`.
    ///
    /// A scalar written over a scalar keeps the old node's trivia. Anything
    /// else swaps in a fresh node; only the entry's key survives.
    pub fn set(&mut self, path: impl Into<Path>, value: impl Into<Value>) -> Result<(), EditError> {
        let path = path.into();
        let value = value.into();
        if path.is_root() {
            return Err(EditError::RootNotEditable { action: "replaced" });
        }

        let keep_decor = self.root.resolve(&path)?.as_scalar().is_some() && value.is_scalar();

        let node = walk_mut(self.root, &path)?;
        let mut replacement = Node::from_value(value);
        replacement.replace(node, keep_decor);
        *node = replacement;

        tracing::debug!(%path, keep_decor, "set");
        Ok(())
    }

    /// Adds `value` to the container at `path`: under a new key at the end
    /// of a table, or at an index of an array.
    pub fn insert(
        &mut self,
        path: impl Into<Path>,
        at: impl Into<Segment>,
        value: impl Into<Value>,
    ) -> Result<(), EditError> {
        let path = path.into();
        match at.into() {
            Segment::Key(key) => self.insert_entry(&path, key, None, value.into()),
            Segment::Index(index) => self.insert_item(&path, index, value.into()),
        }
    }

    /// Adds `key` to the table at `path` so that it ends up at `index`.
    pub fn insert_at(
        &mut self,
        path: impl Into<Path>,
        key: impl Into<String>,
        index: usize,
        value: impl Into<Value>,
    ) -> Result<(), EditError> {
        self.insert_entry(&path.into(), key.into(), Some(index), value.into())
    }

    /// Appends to the array at `path`.
    pub fn push(&mut self, path: impl Into<Path>, value: impl Into<Value>) -> Result<(), EditError> {
        let path = path.into();
        let len = array_at(self.root.resolve(&path)?, &path)?.len();
        self.insert_item(&path, len, value.into())
    }

    fn insert_entry(&mut self, path: &Path, key: String, index: Option<usize>, value: Value) -> Result<(), EditError> {
        let table = table_at(self.root.resolve(path)?, path)?;
        let len = table.len();
        if table.contains_key(&key) {
            return Err(DuplicateKeyError { key, position: None }.into());
        }
        if let Some(index) = index.filter(|&index| index > len) {
            return Err(EditError::IndexOutOfRange { path: path.to_string(), index, len });
        }

        let index = index.unwrap_or(len);
        tracing::debug!(%path, %key, index, "insert entry");

        let table = table_at_mut(walk_mut(self.root, path)?, path)?;
        table.insert_at(index, Key::new(key), Node::from_value(value));
        Ok(())
    }

    fn insert_item(&mut self, path: &Path, index: usize, value: Value) -> Result<(), EditError> {
        let len = array_at(self.root.resolve(path)?, path)?.len();
        if index > len {
            return Err(EditError::IndexOutOfRange { path: path.to_string(), index, len });
        }

        tracing::debug!(%path, index, "insert item");

        let array = array_at_mut(walk_mut(self.root, path)?, path)?;
        array.insert(index, Node::from_value(value));
        Ok(())
    }

    /// Removes the node at `path` together with its trivia. The parent's
    /// dangling trivia stays.
    pub fn delete(&mut self, path: impl Into<Path>) -> Result<(), EditError> {
        let path = path.into();
        let (Some(parent), Some(last)) = (path.parent(), path.last()) else {
            return Err(EditError::RootNotEditable { action: "deleted" });
        };
        self.root.resolve(&path)?;

        match (last, walk_mut(self.root, &parent)?.kind_mut()) {
            (Segment::Key(key), NodeKind::Table(table)) => {
                table.remove(key);
            }
            (Segment::Index(index), NodeKind::Array(array)) => {
                array.remove(*index);
            }
            _ => {}
        }

        tracing::debug!(%path, "delete");
        Ok(())
    }

    /// Puts the keys of the table at `path` in `order`, which must be a
    /// permutation of them. Values and trivia travel with their keys.
    pub fn reorder<K: AsRef<str>>(
        &mut self,
        path: impl Into<Path>,
        order: impl IntoIterator<Item = K>,
    ) -> Result<(), EditError> {
        let path = path.into();
        let order: Vec<String> = order.into_iter().map(|key| key.as_ref().to_string()).collect();

        let table = table_at(self.root.resolve(&path)?, &path)?;
        if let Err(reason) = check_permutation(table, &order) {
            return Err(InvalidPermutationError { path: path.to_string(), reason }.into());
        }
        let positions = ordinals(table, &order, Node::position);
        let origins = ordinals(table, &order, |node| node.origin().map(u32::from));

        let table = table_at_mut(walk_mut(self.root, &path)?, &path)?;
        table.reorder(&order);
        if !positions.is_empty() || !origins.is_empty() {
            for entry in table.entries_mut() {
                renumber(&mut entry.node, &positions, &origins);
            }
        }

        tracing::debug!(%path, ?order, "reorder");
        Ok(())
    }

    /// Changes the key of the entry at `path`, keeping its place, value and
    /// trivia.
    pub fn rename(&mut self, path: impl Into<Path>, new_key: impl Into<String>) -> Result<(), EditError> {
        let path = path.into();
        let new_key = new_key.into();
        let (Some(parent), Some(last)) = (path.parent(), path.last()) else {
            return Err(EditError::RootNotEditable { action: "renamed" });
        };
        let Segment::Key(old_key) = last else {
            let found = self.root.resolve(&parent)?.type_name();
            return Err(TypeMismatchError { path: parent.to_string(), expected: "table", found }.into());
        };

        self.root.resolve(&path)?;
        let table = table_at(self.root.resolve(&parent)?, &parent)?;
        if *old_key != new_key && table.contains_key(&new_key) {
            return Err(DuplicateKeyError { key: new_key, position: None }.into());
        }

        let table = table_at_mut(walk_mut(self.root, &parent)?, &parent)?;
        if let Some(entry) = table.rename(old_key, &new_key) {
            entry.node.mark_dirty();
            forget_headers(&mut entry.node);
        }

        tracing::debug!(%path, %new_key, "rename");
        Ok(())
    }
}

/// Follows `path`, marking every node on the way dirty.
fn walk_mut<'n>(mut node: &'n mut Node, path: &Path) -> Result<&'n mut Node, EditError> {
    node.mark_dirty();
    for segment in path.segments() {
        node = node
            .child_mut(segment)
            .ok_or_else(|| PathNotFoundError { path: path.to_string(), segment: segment.to_string() })?;
        node.mark_dirty();
    }
    Ok(node)
}

fn mismatch(path: &Path, expected: &'static str, node: &Node) -> EditError {
    TypeMismatchError { path: path.to_string(), expected, found: node.type_name() }.into()
}

fn table_at<'n>(node: &'n Node, path: &Path) -> Result<&'n Table, EditError> {
    node.as_table().ok_or_else(|| mismatch(path, "table", node))
}

fn table_at_mut<'n>(node: &'n mut Node, path: &Path) -> Result<&'n mut Table, EditError> {
    let found = node.type_name();
    node.as_table_mut()
        .ok_or_else(|| TypeMismatchError { path: path.to_string(), expected: "table", found }.into())
}

fn array_at<'n>(node: &'n Node, path: &Path) -> Result<&'n Array, EditError> {
    node.as_array().ok_or_else(|| mismatch(path, "array", node))
}

fn array_at_mut<'n>(node: &'n mut Node, path: &Path) -> Result<&'n mut Array, EditError> {
    let found = node.type_name();
    node.as_array_mut()
        .ok_or_else(|| TypeMismatchError { path: path.to_string(), expected: "array", found }.into())
}

fn check_permutation(table: &Table, order: &[String]) -> Result<(), String> {
    let mut seen = FxHashSet::default();
    for key in order {
        if !table.contains_key(key) {
            return Err(format!("`{key}` is not a key of this table"));
        }
        if !seen.insert(key.as_str()) {
            return Err(format!("`{key}` appears more than once"));
        }
    }
    match table.keys().find(|key| !seen.contains(key)) {
        Some(missing) => Err(format!("`{missing}` is missing")),
        None => Ok(()),
    }
}

/// Ordinals below the table's children, reassigned so that they follow the
/// new key order while occupying the same values as before. Used for section
/// positions and for source origins.
fn ordinals(table: &Table, order: &[String], ordinal: fn(&Node) -> Option<u32>) -> FxHashMap<u32, u32> {
    let mut old = Vec::new();
    for node in order.iter().filter_map(|key| table.get(key)) {
        let start = old.len();
        collect_ordinals(node, ordinal, &mut old);
        old[start..].sort_unstable();
    }

    let mut new = old.clone();
    new.sort_unstable();
    old.into_iter().zip(new).filter(|(old, new)| old != new).collect()
}

fn collect_ordinals(node: &Node, ordinal: fn(&Node) -> Option<u32>, out: &mut Vec<u32>) {
    out.extend(ordinal(node));
    for (_, child) in node.children() {
        collect_ordinals(child, ordinal, out);
    }
}

fn renumber(node: &mut Node, positions: &FxHashMap<u32, u32>, origins: &FxHashMap<u32, u32>) {
    if let Some(position) = node.position().and_then(|position| positions.get(&position)) {
        node.set_position(Some(*position));
    }
    if let Some(origin) = node.origin().and_then(|origin| origins.get(&u32::from(origin))) {
        node.set_origin(Some(TextSize::new(*origin)));
    }
    match node.kind_mut() {
        NodeKind::Table(table) => {
            for entry in table.entries_mut() {
                renumber(&mut entry.node, positions, origins);
            }
        }
        NodeKind::Array(array) => {
            for item in array.items_mut() {
                renumber(item, positions, origins);
            }
        }
        NodeKind::Scalar(_) => {}
    }
}

/// Raw section headers spell out the old key, so a renamed subtree gets
/// fresh ones.
fn forget_headers(node: &mut Node) {
    match node.kind_mut() {
        NodeKind::Table(table) => {
            table.set_header(None);
            for entry in table.entries_mut() {
                entry.node.mark_dirty();
                forget_headers(&mut entry.node);
            }
        }
        NodeKind::Array(array) => {
            for item in array.items_mut() {
                item.mark_dirty();
                forget_headers(item);
            }
        }
        NodeKind::Scalar(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use text_size::{TextRange, TextSize};
    use tinyconf_syntax::{Dialect, Syntax};

    use super::*;
    use crate::{Decor, Document, Scalar, ScalarValue, TableStyle};

    fn span() -> TextRange {
        TextRange::empty(TextSize::new(0))
    }

    fn scalar(value: ScalarValue, repr: &str, leading: &str) -> Node {
        Node::parsed(Scalar::parsed(value, repr), span()).with_decor(Decor::new(leading, "\n"))
    }

    /// `# note\nname = "x"\nport = 8080\n[server]\nhost = "h"\n` built by hand.
    fn document() -> Document {
        let mut root = Table::new(TableStyle::Root);
        root.insert(Key::parsed("name", "name", " = "), scalar(ScalarValue::String("x".into()), "\"x\"", "# note\n"))
            .unwrap();
        root.insert(Key::parsed("port", "port", " = "), scalar(ScalarValue::Integer(8080), "8080", "")).unwrap();

        let mut server = Table::new(TableStyle::Header);
        server.set_header(Some("[server]".into()));
        server
            .insert(Key::parsed("host", "host", " = "), scalar(ScalarValue::String("h".into()), "\"h\"", ""))
            .unwrap();
        let mut server = Node::parsed(server, span()).with_decor(Decor::new("", "\n"));
        server.set_position(Some(0));
        root.insert(Key::new("server"), server).unwrap();

        Document::new(String::new(), Dialect::Toml, Syntax::Toml, None, Node::parsed(root, span()))
    }

    fn keys(document: &Document) -> Vec<&str> {
        document.root().as_table().unwrap().keys().collect()
    }

    #[test]
    fn set_scalar_keeps_trivia() {
        let mut document = document();
        document.editor().set(["name"], "y").unwrap();

        let name = document.get(&Path::from(["name"])).unwrap();
        assert_eq!(name.decor().leading, "# note\n");
        assert_eq!(name.as_scalar().unwrap().value(), &ScalarValue::String("y".into()));
        assert_eq!(name.as_scalar().unwrap().repr(), None);
        assert!(name.is_dirty());
        assert!(document.is_dirty());
        assert!(!document.get(&Path::from(["port"])).unwrap().is_dirty());
    }

    #[test]
    fn set_keeps_layout_and_source_order() {
        let mut document = document();
        let mut editor = document.editor();
        editor.set(["name"], "y").unwrap();
        editor.set(["port"], vec![1, 2]).unwrap();

        let name = document.get(&Path::from(["name"])).unwrap();
        assert!(name.is_synthetic());
        assert!(name.has_layout());
        assert_eq!(name.origin(), Some(TextSize::new(0)));

        let port = document.get(&Path::from(["port"])).unwrap();
        assert!(!port.has_layout());
        assert_eq!(port.origin(), Some(TextSize::new(0)));
    }

    #[test]
    fn edits_show_in_the_outline() {
        let mut document = document();
        let mut editor = document.editor();
        editor.set(["name"], "y").unwrap();
        editor.rename(["port"], "listen").unwrap();
        editor.insert(["server"], "tls", true).unwrap();
        expect![[r##"
            table Root
              name: string String("y") leading="# note\n" trailing="\n"
              <listen>: integer 8080 trailing="\n"
              <server>: table Header "[server]" #0 trailing="\n"
                host: string "h" trailing="\n"
                <tls>: boolean Boolean(true)
        "##]]
        .assert_eq(&document.root().outline());
    }

    #[test]
    fn set_with_new_type_replaces_the_node() {
        let mut document = document();
        document.editor().set(["name"], Value::table([("a", Value::from(1))])).unwrap();

        let name = document.get(&Path::from(["name"])).unwrap();
        assert!(name.decor().is_empty());
        assert!(name.is_synthetic());
        assert_eq!(name.as_table().unwrap().style(), TableStyle::Auto);
        assert_eq!(keys(&document), ["name", "port", "server"]);
    }

    #[test]
    fn set_requires_an_existing_path() {
        let mut document = document();
        let error = document.editor().set(["server", "missing"], 1).unwrap_err();
        assert_eq!(
            error,
            EditError::PathNotFound(PathNotFoundError {
                path: "server.missing".into(),
                segment: "missing".into()
            })
        );
    }

    #[test]
    fn descending_into_a_scalar_is_a_type_mismatch() {
        let mut document = document();
        let error = document.editor().set(["port", "x"], 1).unwrap_err();
        assert_eq!(
            error,
            EditError::TypeMismatch(TypeMismatchError { path: "port".into(), expected: "table", found: "integer" })
        );
    }

    #[test]
    fn failed_edits_leave_the_tree_untouched() {
        let mut document = document();
        let snapshot = document.clone();

        let mut editor = document.editor();
        assert!(editor.set(["nope"], 1).is_err());
        assert!(editor.insert(Path::root(), "port", 1).is_err());
        assert!(editor.insert_at(Path::root(), "new", 9, 1).is_err());
        assert!(editor.insert(["port"], "x", 1).is_err());
        assert!(editor.delete(["server", "nope"]).is_err());
        assert!(editor.delete(Path::root()).is_err());
        assert!(editor.reorder(Path::root(), ["name", "port"]).is_err());
        assert!(editor.rename(["name"], "port").is_err());

        assert_eq!(document, snapshot);
        assert!(!document.is_dirty());
    }

    #[test]
    fn insert_appends_or_lands_at_index() {
        let mut document = document();
        let mut editor = document.editor();
        editor.insert(Path::root(), "last", true).unwrap();
        editor.insert_at(Path::root(), "first", 0, 1.5).unwrap();
        assert_eq!(keys(&document), ["first", "name", "port", "server", "last"]);

        let error = document.editor().insert(Path::root(), "name", 1).unwrap_err();
        assert_eq!(error, EditError::DuplicateKey(DuplicateKeyError { key: "name".into(), position: None }));
    }

    #[test]
    fn array_items() {
        let mut document = document();
        let mut editor = document.editor();
        editor.insert(Path::root(), "ports", vec![1, 2]).unwrap();
        editor.push(["ports"], 4).unwrap();
        editor.insert(["ports"], 2_usize, 3).unwrap();
        editor.delete(Path::from(["ports"]).join(0_usize)).unwrap();

        let ports = document.get(&Path::from(["ports"])).unwrap().to_value();
        assert_eq!(ports, Value::from(vec![2, 3, 4]));

        let error = document.editor().insert(["ports"], 7_usize, 0).unwrap_err();
        assert_eq!(error, EditError::IndexOutOfRange { path: "ports".into(), index: 7, len: 3 });
    }

    #[test]
    fn deleting_an_item_takes_its_line_comment() {
        let mut array = Array::new(crate::ArrayStyle::Bracketed);
        array.push(scalar(ScalarValue::Integer(1), "1", "\n  "));
        array.push(scalar(ScalarValue::Integer(2), "2", " # one\r\n  "));
        array.set_dangling(" # two\n  # keep\n");
        let mut root = Table::new(TableStyle::Root);
        root.insert(Key::parsed("a", "a", " = "), Node::parsed(array, span())).unwrap();
        let mut document =
            Document::new(String::new(), Dialect::Toml, Syntax::Toml, None, Node::parsed(root, span()));

        document.editor().delete(Path::from(["a"]).join(0_usize)).unwrap();
        let a = document.get(&Path::from(["a"])).unwrap().as_array().unwrap();
        assert_eq!(a.items()[0].decor().leading, "\r\n  ");

        document.editor().delete(Path::from(["a"]).join(0_usize)).unwrap();
        let a = document.get(&Path::from(["a"])).unwrap().as_array().unwrap();
        assert!(a.is_empty());
        assert_eq!(a.dangling(), "\n  # keep\n");
    }

    #[test]
    fn delete_removes_trivia_with_the_node() {
        let mut document = document();
        document.editor().delete(["name"]).unwrap();
        assert_eq!(keys(&document), ["port", "server"]);
        assert_eq!(document.get(&Path::from(["port"])).unwrap().decor().leading, "");
    }

    #[test]
    fn reorder_guards_the_permutation() {
        let mut document = document();
        let mut editor = document.editor();

        let reason = |error: EditError| match error {
            EditError::InvalidPermutation(error) => error.reason,
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(reason(editor.reorder(Path::root(), ["port", "name"]).unwrap_err()), "`server` is missing");
        assert_eq!(
            reason(editor.reorder(Path::root(), ["port", "port", "server"]).unwrap_err()),
            "`port` appears more than once"
        );
        assert_eq!(
            reason(editor.reorder(Path::root(), ["port", "name", "x"]).unwrap_err()),
            "`x` is not a key of this table"
        );

        editor.reorder(Path::root(), ["server", "port", "name"]).unwrap();
        assert_eq!(keys(&document), ["server", "port", "name"]);
        assert_eq!(document.get(&Path::from(["name"])).unwrap().decor().leading, "# note\n");
    }

    #[test]
    fn reorder_moves_section_positions_with_their_keys() {
        let mut document = document();
        let mut editor = document.editor();
        editor.insert(Path::root(), "other", Value::table([("k", Value::from(1))])).unwrap();
        editor.reorder(Path::root(), ["name", "port", "other", "server"]).unwrap();
        assert_eq!(document.get(&Path::from(["server"])).unwrap().position(), Some(0));
    }

    #[test]
    fn rename_keeps_place_and_trivia() {
        let mut document = document();
        document.editor().rename(["name"], "title").unwrap();
        document.editor().rename(["server"], "backend").unwrap();

        assert_eq!(keys(&document), ["title", "port", "backend"]);
        let title = document.root().as_table().unwrap().entry("title").unwrap();
        assert_eq!(title.key.repr, None);
        assert_eq!(title.key.separator.as_deref(), Some(" = "));
        assert_eq!(title.node.decor().leading, "# note\n");

        let backend = document.get(&Path::from(["backend"])).unwrap();
        assert_eq!(backend.as_table().unwrap().header(), None);
        assert_eq!(backend.position(), Some(0));
    }

    #[test]
    fn rename_of_an_array_item_is_a_type_mismatch() {
        let mut document = document();
        document.editor().insert(Path::root(), "list", vec!["a"]).unwrap();
        let error = document.editor().rename(Path::from(["list"]).join(0_usize), "b").unwrap_err();
        assert!(matches!(error, EditError::TypeMismatch(TypeMismatchError { found: "array", .. })));
    }
}
