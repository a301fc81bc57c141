use std::fmt;

use line_index::LineIndex;
use text_size::TextSize;

/// A location in a source buffer: byte offset plus 1-based line and column.
///
/// Columns count bytes, not characters, so they match editors that report
/// UTF-8 offsets.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    pub offset: TextSize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Resolves `offset` against `text`.
    pub fn locate(text: &str, offset: TextSize) -> Self {
        let offset = offset.min(TextSize::of(text));
        let line_col = LineIndex::new(text).line_col(offset);
        Self { offset, line: line_col.line + 1, column: line_col.col + 1 }
    }

    pub fn offset(self) -> usize {
        self.offset.into()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_and_columns_are_one_based() {
        let text = "a = 1\nbb = 2\n";
        let position = Position::locate(text, TextSize::new(9));
        assert_eq!((position.line, position.column), (2, 4));
        assert_eq!(position.to_string(), "2:4");
    }

    #[test]
    fn offsets_past_the_end_are_clamped() {
        let position = Position::locate("x", TextSize::new(40));
        assert_eq!(position.offset(), 1);
        assert_eq!((position.line, position.column), (1, 2));
    }
}
