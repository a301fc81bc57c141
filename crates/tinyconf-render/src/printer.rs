use tinyconf_errors::{Loss, LossyConversionWarning};
use tinyconf_syntax::{Syntax, TriviaPiece, TriviaPieceKind};
use tinyconf_tree::{Entry, Node, Path};

use crate::RenderOptions;

/// Output buffer shared by the printers of every syntax.
///
/// In fidelity mode (same syntax as the source) clean nodes are copied from
/// the source and dirty containers are rebuilt from their stored pieces. In
/// fresh mode (a different syntax) everything is printed canonically and
/// only trivia the target can hold survives.
pub(crate) struct Printer<'d> {
    pub(crate) source: &'d str,
    pub(crate) options: &'d RenderOptions,
    pub(crate) from: Syntax,
    pub(crate) fresh: bool,
    /// Line terminator for lines without one of their own.
    pub(crate) newline: &'static str,
    pub(crate) out: String,
    pub(crate) warnings: Vec<LossyConversionWarning>,
}

impl<'d> Printer<'d> {
    pub(crate) fn new(source: &'d str, options: &'d RenderOptions, from: Syntax, to: Syntax) -> Self {
        let fresh = from != to;
        let newline = if !fresh && first_line_ending(source) == Some("\r\n") { "\r\n" } else { "\n" };
        Self { source, options, from, fresh, newline, out: String::new(), warnings: Vec::new() }
    }

    /// The node's source text, if it can be copied as is.
    pub(crate) fn verbatim(&self, node: &Node) -> Option<&'d str> {
        if self.fresh { None } else { node.original_text(self.source) }
    }

    /// Whether the node brings its own trivia, as opposed to a node built
    /// from a value that should borrow its neighbours' layout.
    pub(crate) fn has_layout(&self, node: &Node) -> bool {
        !self.fresh && node.has_layout()
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub(crate) fn newline(&mut self) {
        self.out.push_str(self.newline);
    }

    pub(crate) fn ensure_newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.newline();
        }
    }

    /// Indentation of the line being written.
    pub(crate) fn line_indent(&self) -> String {
        let line = &self.out[self.out.rfind('\n').map_or(0, |newline| newline + 1)..];
        let content = line.trim_start_matches([' ', '\t']);
        line[..line.len() - content.len()].to_string()
    }

    pub(crate) fn indent_unit(&self) -> String {
        " ".repeat(self.options.indent)
    }

    pub(crate) fn warn(&mut self, path: &Path, loss: Loss, message: impl Into<String>) {
        let warning = LossyConversionWarning { path: path.to_string(), loss, message: message.into() };
        tracing::warn!(%warning, "lossy conversion");
        self.warnings.push(warning);
    }

    pub(crate) fn has_comment(&self, trivia: &str) -> bool {
        TriviaPiece::split(trivia, self.from.comment_prefix())
            .iter()
            .any(|piece| piece.kind == TriviaPieceKind::Comment)
    }

    /// Drops the trivia of one attachment point, warning once if it held a
    /// comment.
    pub(crate) fn drop_trivia(&mut self, path: &Path, trivia: &[&str]) {
        if trivia.iter().any(|text| self.has_comment(text)) {
            self.warn(path, Loss::Comments, "comments cannot be expressed in the target dialect");
        }
    }

    /// The comment and blank lines of a leading trivia, without the
    /// indentation of the line the item itself starts on.
    pub(crate) fn comment_lines(&self, leading: &str) -> String {
        let Some(prefix) = self.from.comment_prefix() else {
            return String::new();
        };
        let mut lines = String::new();
        for line in leading.split_inclusive('\n') {
            let text = line.trim();
            if text.starts_with(prefix) {
                lines.push_str(text);
                lines.push('\n');
            } else if text.is_empty() && line.ends_with('\n') {
                lines.push('\n');
            }
        }
        lines
    }

    /// The comment on the rest of an item's line, if there is one.
    pub(crate) fn line_comment<'t>(&self, trailing: &'t str) -> Option<&'t str> {
        let prefix = self.from.comment_prefix()?;
        let comment = trailing.trim();
        comment.starts_with(prefix).then_some(comment)
    }
}

fn first_line_ending(source: &str) -> Option<&str> {
    let newline = source.find('\n')?;
    Some(if source[..newline].ends_with('\r') { "\r\n" } else { "\n" })
}

/// Leading trivia for an item without its own: the layout of the nearest
/// sibling that has one, reduced to whitespace.
///
/// `bracketed` items keep every whitespace character (newline included);
/// line-based items only keep the indentation of their line.
pub(crate) fn borrowed_leading<'n>(
    printer: &Printer<'_>,
    siblings: impl IntoIterator<Item = &'n Node>,
    index: usize,
    bracketed: bool,
) -> Option<String> {
    let siblings: Vec<&Node> = siblings.into_iter().collect();
    let before = siblings[..index.min(siblings.len())].iter().rev();
    let after = siblings.iter().skip(index + 1);
    let donor = before.chain(after).find(|node| printer.has_layout(node))?;

    let leading = donor.decor().leading.as_str();
    let blank = leading.chars().all(char::is_whitespace);
    let reduced = match leading.rfind('\n') {
        _ if blank && bracketed => leading,
        Some(newline) if bracketed => &leading[newline..],
        Some(newline) => &leading[newline + 1..],
        None if bracketed => " ",
        None => leading,
    };
    Some(reduced.chars().filter(|c| c.is_whitespace()).collect())
}

/// The key/value separator of the nearest sibling that kept one.
pub(crate) fn borrowed_separator<'n>(entries: impl IntoIterator<Item = &'n Entry>) -> Option<String> {
    entries.into_iter().find_map(|entry| entry.key.separator.clone())
}
