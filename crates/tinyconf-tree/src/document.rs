use tinyconf_errors::EditError;
use tinyconf_syntax::{Dialect, Syntax};

use crate::{Editor, Node, Path};

/// A parsed buffer and its tree.
///
/// The tree is only reachable through shared references; [`Document::editor`]
/// is the one way to change it.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    source: String,
    dialect: Dialect,
    syntax: Syntax,
    tag: Option<String>,
    root: Node,
}

impl Document {
    /// `tag` is the verbatim `#!7cfg` line (terminator included) of a
    /// `.7cfg` buffer.
    pub fn new(source: String, dialect: Dialect, syntax: Syntax, tag: Option<String>, root: Node) -> Self {
        Self { source, dialect, syntax, tag, root }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn get(&self, path: &Path) -> Option<&Node> {
        self.root.get_path(path)
    }

    pub fn resolve(&self, path: &Path) -> Result<&Node, EditError> {
        self.root.resolve(path)
    }

    /// Whether anything changed since the document was parsed.
    pub fn is_dirty(&self) -> bool {
        self.root.is_dirty()
    }

    pub fn editor(&mut self) -> Editor<'_> {
        Editor::new(&mut self.root)
    }
}
